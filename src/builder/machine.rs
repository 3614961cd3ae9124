//! Builder for machines with explicit states.

use crate::builder::error::BuildError;
use crate::checkpoint::Checkpoint;
use crate::core::{State, Step};
use crate::engine::sequence::{Sequence, Slot};
use crate::engine::Machine;
use std::any::type_name;
use std::sync::Arc;
use tracing::debug;

/// Builder for machines whose steps carry their own states.
///
/// Steps are appended in order; validation happens in [`build`](Self::build)
/// so the list can be assembled from several sources first. `build` borrows
/// the builder, so any number of machines can be built from it at different
/// starting states.
pub struct MachineBuilder<S: State, D> {
    slots: Vec<Slot<S, D>>,
}

impl<S, D> MachineBuilder<S, D>
where
    S: State + 'static,
    D: Send + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Append a step.
    pub fn add_step<T>(self, step: T) -> Self
    where
        T: Step<S, D> + 'static,
    {
        self.add_shared(Arc::new(step))
    }

    /// Append a step that is also held elsewhere.
    pub fn add_shared(mut self, step: Arc<dyn Step<S, D>>) -> Self {
        self.slots.push(Slot::step(step));
        self
    }

    /// Append a step that may be absent.
    /// Returns [`BuildError::NullStep`] for `None`.
    pub fn try_add_step(self, step: Option<Arc<dyn Step<S, D>>>) -> Result<Self, BuildError> {
        let step = step.ok_or(BuildError::NullStep)?;
        Ok(self.add_shared(step))
    }

    /// Append several steps, keeping their iteration order.
    pub fn add_steps<I>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Step<S, D>>>,
    {
        self.slots.extend(steps.into_iter().map(Slot::step));
        self
    }

    /// Append a collection that may be absent.
    /// Returns [`BuildError::NullStep`] for `None`.
    pub fn try_add_steps<I>(self, steps: Option<I>) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Arc<dyn Step<S, D>>>,
    {
        let steps = steps.ok_or(BuildError::NullStep)?;
        Ok(self.add_steps(steps))
    }

    /// Append an end marker bound to `state`.
    ///
    /// Repeated calls append more markers; only the first one the machine
    /// reaches is ever executed. Steps added after the last marker still run,
    /// but when the final one succeeds the machine stops with the state left on
    /// that step, so a machine rebuilt at the saved state runs it again. Call
    /// this after the last step.
    pub fn set_end_state(mut self, state: S) -> Self {
        self.slots.push(Slot::end(state));
        self
    }

    pub fn has_end_state(&self) -> bool {
        self.slots.iter().any(Slot::is_end)
    }

    /// Number of slots, end markers included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Build a machine positioned at `state`.
    ///
    /// Fails with [`BuildError::MissingStep`] when only end markers (or
    /// nothing) were added and with [`BuildError::MissingEndState`] when no
    /// end marker was set.
    pub fn build<'d>(&self, state: S, data: &'d mut D) -> Result<Machine<'d, S, D>, BuildError> {
        self.ensure_steps()?;
        if !self.has_end_state() {
            return Err(BuildError::MissingEndState {
                state: type_name::<S>(),
                data: type_name::<D>(),
            });
        }
        self.log_trailing_steps();
        Ok(Machine::new(self.sequence(), state, data))
    }

    /// Build a machine at the position captured by `checkpoint`.
    pub fn resume<'d>(
        &self,
        checkpoint: &Checkpoint<S>,
        data: &'d mut D,
    ) -> Result<Machine<'d, S, D>, BuildError> {
        checkpoint.validate()?;
        let machine = self.build(checkpoint.state.clone(), data)?;
        Ok(machine.with_history(checkpoint.history.clone()))
    }

    pub(crate) fn ensure_steps(&self) -> Result<(), BuildError> {
        if self.slots.iter().all(Slot::is_end) {
            return Err(BuildError::MissingStep);
        }
        Ok(())
    }

    /// Real steps placed after the last end marker.
    pub(crate) fn steps_after_end(&self) -> usize {
        self.slots.iter().rev().take_while(|slot| !slot.is_end()).count()
    }

    pub(crate) fn log_trailing_steps(&self) {
        let trailing = self.steps_after_end();
        if trailing > 0 {
            debug!(steps = trailing, "steps follow the last end marker");
        }
    }

    pub(crate) fn sequence(&self) -> Sequence<S, D> {
        self.slots.iter().cloned().collect()
    }
}

impl<S, D> Default for MachineBuilder<S, D>
where
    S: State + 'static,
    D: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
