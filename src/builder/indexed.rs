//! Builder for machines with implicit integer states.

use crate::builder::error::BuildError;
use crate::builder::machine::MachineBuilder;
use crate::checkpoint::Checkpoint;
use crate::core::{DataStep, IndexedStep};
use crate::engine::sequence::Slot;
use crate::engine::Machine;
use std::sync::Arc;

/// Builder for machines over state-less [`DataStep`]s.
///
/// Each data step is bound to its position in the sequence (end markers
/// included), so the states run `0, 1, 2, ...` in registration order. When no
/// end state is set, `build` appends one at the next index.
///
/// # Example
///
/// ```rust
/// use stepline::builder::IndexedBuilder;
/// use stepline::core::data_fn;
///
/// let builder = IndexedBuilder::new()
///     .add_step(data_fn(|log: &mut Vec<String>| { log.push("fetch".into()); true }))
///     .add_step(data_fn(|log: &mut Vec<String>| { log.push("verify".into()); true }));
///
/// let mut log = Vec::new();
/// let machine = builder.build(&mut log).unwrap();
/// assert_eq!(*machine.state(), 0);
/// ```
pub struct IndexedBuilder<D> {
    inner: MachineBuilder<usize, D>,
}

impl<D> IndexedBuilder<D>
where
    D: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: MachineBuilder::new(),
        }
    }

    /// Append a data step at the next index.
    pub fn add_step<T>(self, step: T) -> Self
    where
        T: DataStep<D> + 'static,
    {
        self.add_shared(Arc::new(step))
    }

    pub fn add_shared(self, step: Arc<dyn DataStep<D>>) -> Self {
        let index = self.inner.len();
        Self {
            inner: self.inner.add_step(IndexedStep::new(step, index)),
        }
    }

    /// Append a data step that may be absent.
    /// Returns [`BuildError::NullStep`] for `None`.
    pub fn try_add_step(self, step: Option<Arc<dyn DataStep<D>>>) -> Result<Self, BuildError> {
        let step = step.ok_or(BuildError::NullStep)?;
        Ok(self.add_shared(step))
    }

    pub fn add_steps<I>(self, steps: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn DataStep<D>>>,
    {
        steps.into_iter().fold(self, Self::add_shared)
    }

    /// Append a collection that may be absent.
    /// Returns [`BuildError::NullStep`] for `None`.
    pub fn try_add_steps<I>(self, steps: Option<I>) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Arc<dyn DataStep<D>>>,
    {
        let steps = steps.ok_or(BuildError::NullStep)?;
        Ok(self.add_steps(steps))
    }

    /// Append an end marker at an explicit index.
    pub fn set_end_state(self, state: usize) -> Self {
        Self {
            inner: self.inner.set_end_state(state),
        }
    }

    /// Number of slots, end markers included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Build a machine starting at the first step.
    pub fn build<'d>(&self, data: &'d mut D) -> Result<Machine<'d, usize, D>, BuildError> {
        self.build_at(0, data)
    }

    /// Build a machine positioned at `state`.
    ///
    /// Fails with [`BuildError::MissingStep`] when no data step was added.
    pub fn build_at<'d>(
        &self,
        state: usize,
        data: &'d mut D,
    ) -> Result<Machine<'d, usize, D>, BuildError> {
        self.inner.ensure_steps()?;
        if self.inner.has_end_state() {
            self.inner.log_trailing_steps();
            return Ok(Machine::new(self.inner.sequence(), state, data));
        }

        let end = self.inner.len();
        let mut slots = self.inner.sequence().to_vec();
        slots.push(Slot::end(end));
        Ok(Machine::new(slots.into(), state, data))
    }

    /// Build a machine at the position captured by `checkpoint`.
    pub fn resume<'d>(
        &self,
        checkpoint: &Checkpoint<usize>,
        data: &'d mut D,
    ) -> Result<Machine<'d, usize, D>, BuildError> {
        checkpoint.validate()?;
        let machine = self.build_at(checkpoint.state, data)?;
        Ok(machine.with_history(checkpoint.history.clone()))
    }
}

impl<D> Default for IndexedBuilder<D>
where
    D: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Continue with the explicit-state API over the already indexed steps.
impl<D> From<IndexedBuilder<D>> for MachineBuilder<usize, D>
where
    D: Send + 'static,
{
    fn from(builder: IndexedBuilder<D>) -> Self {
        builder.inner
    }
}
