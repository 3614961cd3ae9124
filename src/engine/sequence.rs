//! Ordered step sequence shared by builders and machines.

use crate::core::{EndStep, State, Step};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One entry of the sequence: a step with its state read once up front.
pub(crate) struct Slot<S, D> {
    state: S,
    step: Arc<dyn Step<S, D>>,
    end: bool,
}

impl<S, D> Slot<S, D>
where
    S: State,
    D: Send + 'static,
{
    pub(crate) fn step(step: Arc<dyn Step<S, D>>) -> Self {
        Self {
            state: step.state(),
            step,
            end: false,
        }
    }

    pub(crate) fn end(state: S) -> Self
    where
        S: 'static,
    {
        Self {
            state: state.clone(),
            step: Arc::new(EndStep::new(state)),
            end: true,
        }
    }

    pub(crate) fn state(&self) -> &S {
        &self.state
    }

    pub(crate) fn is_end(&self) -> bool {
        self.end
    }

    pub(crate) async fn execute(&self, data: &mut D, cancel: &CancellationToken) -> bool {
        self.step.execute(data, cancel).await
    }
}

impl<S: Clone, D> Clone for Slot<S, D> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            step: Arc::clone(&self.step),
            end: self.end,
        }
    }
}

/// Read-only view over the slots a machine walks.
pub(crate) type Sequence<S, D> = Arc<[Slot<S, D>]>;
