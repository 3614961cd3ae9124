//! Machine that walks a step sequence one step per call.

use crate::checkpoint::{Checkpoint, CHECKPOINT_VERSION};
use crate::core::{State, StateHistory, StateTransition};
use crate::engine::sequence::Sequence;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use uuid::Uuid;

/// Sequential step executor.
///
/// A machine borrows the caller's data for its whole life and walks the step
/// sequence with a forward-only cursor. Machines are created by
/// [`MachineBuilder`](crate::builder::MachineBuilder),
/// [`IndexedBuilder`](crate::builder::IndexedBuilder) or
/// [`Factory`](crate::factory::Factory); the sequence is never empty.
///
/// # Example
///
/// ```rust
/// use stepline::builder::IndexedBuilder;
/// use stepline::core::data_fn;
///
/// # tokio_test_block(async {
/// let mut total = 0u32;
/// let builder = IndexedBuilder::new()
///     .add_step(data_fn(|n: &mut u32| { *n += 1; true }))
///     .add_step(data_fn(|n: &mut u32| { *n += 10; true }));
///
/// let mut machine = builder.build(&mut total).unwrap();
/// assert!(machine.advance().await);
/// assert!(machine.advance().await);
/// assert!(!machine.advance().await);
/// assert_eq!(*machine.state(), 2);
/// drop(machine);
/// assert_eq!(total, 11);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct Machine<'d, S: State, D> {
    steps: Sequence<S, D>,
    current: S,
    data: &'d mut D,
    cursor: Option<usize>,
    attempts: usize,
    history: StateHistory<S>,
}

impl<'d, S, D> Machine<'d, S, D>
where
    S: State,
    D: Send + 'static,
{
    pub(crate) fn new(steps: Sequence<S, D>, state: S, data: &'d mut D) -> Self {
        debug_assert!(!steps.is_empty());
        Self {
            steps,
            current: state,
            data,
            cursor: None,
            attempts: 0,
            history: StateHistory::new(),
        }
    }

    pub(crate) fn with_history(mut self, history: StateHistory<S>) -> Self {
        self.history = history;
        self
    }

    /// Current state. Persist this to resume later with a fresh machine.
    pub fn state(&self) -> &S {
        &self.current
    }

    pub fn data(&self) -> &D {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut D {
        &mut *self.data
    }

    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    /// Executions of the step under the cursor since the last advance. Calls
    /// that land on an end marker are not counted.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// True once the cursor has moved past the last slot.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_some_and(|index| index >= self.steps.len())
    }

    /// Run the step bound to the current state.
    ///
    /// Returns `true` when the step succeeded and the machine moved on to the
    /// next step's state. Returns `false` when the step declined (the same step
    /// runs again on the next call), when the current state matches no
    /// remaining step, or when the sequence is exhausted.
    pub async fn advance(&mut self) -> bool {
        self.advance_with(&CancellationToken::new()).await
    }

    /// Like [`advance`](Self::advance), forwarding `cancel` to the step.
    pub async fn advance_with(&mut self, cancel: &CancellationToken) -> bool {
        let Some(index) = self.seek() else {
            debug!(state = %self.current.name(), "no step matches current state");
            return false;
        };

        let slot = &self.steps[index];
        if !slot.is_end() {
            self.attempts += 1;
        }
        if !slot.execute(&mut *self.data, cancel).await {
            if !slot.is_end() {
                debug!(
                    state = %self.current.name(),
                    attempt = self.attempts,
                    "step declined to advance"
                );
            }
            return false;
        }

        let next = index + 1;
        self.cursor = Some(next);

        let Some(slot) = self.steps.get(next) else {
            debug!(state = %self.current.name(), "step sequence exhausted");
            return false;
        };

        let from = std::mem::replace(&mut self.current, slot.state().clone());
        debug!(
            from = %from.name(),
            to = %self.current.name(),
            attempt = self.attempts,
            "advanced"
        );
        self.history = self.history.record(StateTransition {
            from,
            to: self.current.clone(),
            timestamp: Utc::now(),
            attempt: self.attempts,
        });
        self.attempts = 0;
        true
    }

    /// Advance until the machine stops. Returns the number of successful
    /// advances.
    pub async fn run(&mut self) -> usize {
        self.run_with(&CancellationToken::new()).await
    }

    pub async fn run_with(&mut self, cancel: &CancellationToken) -> usize {
        let mut advanced = 0;
        while self.advance_with(cancel).await {
            advanced += 1;
        }
        advanced
    }

    /// Capture the current position.
    pub fn checkpoint(&self) -> Checkpoint<S> {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            state: self.current.clone(),
            attempt: self.attempts,
            history: self.history.clone(),
        }
    }

    /// Position the cursor on the first slot at or after it whose state is
    /// the current state. Parks the cursor past the end when none is left.
    fn seek(&mut self) -> Option<usize> {
        let start = match self.cursor {
            Some(index) => match self.steps.get(index) {
                Some(slot) if *slot.state() == self.current => return Some(index),
                _ => index,
            },
            None => 0,
        };

        trace!(state = %self.current.name(), from = start, "scanning for step");
        let found = self
            .steps
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, slot)| *slot.state() == self.current)
            .map(|(index, _)| index);

        self.cursor = Some(found.unwrap_or(self.steps.len()));
        found
    }
}
