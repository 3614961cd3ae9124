use crate::builder::BuildError;
use thiserror::Error;

/// Errors raised while creating a machine from a named configuration.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Container could not resolve step types: {}", .types.join(", "))]
    UnresolvedSteps { types: Vec<&'static str> },
}
