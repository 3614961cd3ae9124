//! History of the state changes performed by a machine.
//!
//! Every successful advance that lands on a new slot is recorded as a
//! [`StateTransition`]. Histories are immutable values: `record` returns a new
//! history.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single advance.
///
/// `attempt` is the number of times the step bound to `from` was executed
/// before it allowed the machine to move on; a step that succeeds on the
/// first try has `attempt == 1`.
///
/// # Example
///
/// ```rust
/// use stepline::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: 0usize,
///     to: 1usize,
///     timestamp: Utc::now(),
///     attempt: 1,
/// };
/// assert_eq!(transition.attempt, 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state of the step that succeeded
    pub from: S,
    /// The state adopted from the next step in the sequence
    pub to: S,
    /// When the advance happened
    pub timestamp: DateTime<Utc>,
    /// How many executions the step needed
    pub attempt: usize,
}

/// Ordered history of advances.
///
/// # Example
///
/// ```rust
/// use stepline::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition { from: 0usize, to: 1, timestamp: Utc::now(), attempt: 1 })
///     .record(StateTransition { from: 1usize, to: 2, timestamp: Utc::now(), attempt: 3 });
///
/// assert_eq!(history.get_path(), vec![&0usize, &1, &2]);
/// assert_eq!(history.total_attempts(), 4);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// States traversed, in order: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        path.extend(self.transitions.iter().map(|t| &t.to));
        path
    }

    /// Time between the first and the last recorded advance.
    ///
    /// `None` when nothing was recorded.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.first()?;
        let last = self.transitions.last()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// The most recent advance.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    /// Sum of step executions across all recorded advances.
    pub fn total_attempts(&self) -> usize {
        self.transitions.iter().map(|t| t.attempt).sum()
    }

    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Fetch,
        Verify,
        Publish,
    }

    impl State for TestState {}

    fn transition(from: TestState, to: TestState, attempt: usize) -> StateTransition<TestState> {
        StateTransition {
            from,
            to,
            timestamp: Utc::now(),
            attempt,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<TestState> = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let new_history = history.record(transition(TestState::Fetch, TestState::Verify, 1));

        assert_eq!(history.len(), 0);
        assert_eq!(new_history.len(), 1);
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let history = StateHistory::new()
            .record(transition(TestState::Fetch, TestState::Verify, 1))
            .record(transition(TestState::Verify, TestState::Publish, 2));

        let path = history.get_path();
        assert_eq!(
            path,
            vec![&TestState::Fetch, &TestState::Verify, &TestState::Publish]
        );
        assert_eq!(history.last().map(|t| &t.to), Some(&TestState::Publish));
    }

    #[test]
    fn total_attempts_sums_executions() {
        let history = StateHistory::new()
            .record(transition(TestState::Fetch, TestState::Verify, 1))
            .record(transition(TestState::Verify, TestState::Publish, 4));

        assert_eq!(history.total_attempts(), 5);
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let history = StateHistory::new().record(transition(TestState::Fetch, TestState::Verify, 1));

        std::thread::sleep(Duration::from_millis(10));

        let history = history.record(transition(TestState::Verify, TestState::Publish, 1));

        let duration = history.duration().unwrap();
        assert!(duration >= Duration::from_millis(10));
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let history = StateHistory::new().record(transition(TestState::Fetch, TestState::Verify, 1));

        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new().record(transition(TestState::Fetch, TestState::Verify, 2));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<TestState> = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.len(), 1);
        assert_eq!(deserialized.transitions()[0].attempt, 2);
    }
}
