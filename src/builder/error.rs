//! Build errors for machine builders.

use crate::checkpoint::CheckpointError;
use thiserror::Error;

/// Errors raised while assembling or building a machine.
///
/// All of them surface before any step runs; a built machine never fails.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Step is absent. Pass a step or a collection of steps")]
    NullStep,

    #[error("State machine must have at least one step")]
    MissingStep,

    #[error("Cannot build state machine over {state} and {data} without an end state. Call .set_end_state(state)")]
    MissingEndState {
        state: &'static str,
        data: &'static str,
    },

    #[error("Cannot resume from checkpoint: {0}")]
    Checkpoint(#[from] CheckpointError),
}
