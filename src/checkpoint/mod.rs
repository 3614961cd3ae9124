//! Serializable snapshots of a machine position.
//!
//! A checkpoint records where a machine stands so that a fresh machine can be
//! rebuilt at the same place later. Step actions and data are not part of it;
//! the caller re-supplies both when resuming. Storing checkpoints is left to
//! the caller.

use crate::core::{State, StateHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Snapshot of a machine, created by
/// [`Machine::checkpoint`](crate::engine::Machine::checkpoint).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<S: State> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// State to resume at
    pub state: S,

    /// Executions of the current step that had not yet succeeded
    pub attempt: usize,

    /// Advances recorded so far
    pub history: StateHistory<S>,
}

impl<S: State> Checkpoint<S> {
    /// Reject checkpoints written by an incompatible format version.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateTransition;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Phase {
        Download,
        Extract,
    }

    impl State for Phase {}

    fn checkpoint() -> Checkpoint<Phase> {
        let history = StateHistory::new().record(StateTransition {
            from: Phase::Download,
            to: Phase::Extract,
            timestamp: Utc::now(),
            attempt: 2,
        });
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            state: Phase::Extract,
            attempt: 1,
            history,
        }
    }

    #[test]
    fn json_preserves_position() {
        let original = checkpoint();
        let restored = Checkpoint::<Phase>::from_json(&original.to_json().unwrap()).unwrap();

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.state, Phase::Extract);
        assert_eq!(restored.attempt, 1);
        assert_eq!(restored.history.get_path(), vec![&Phase::Download, &Phase::Extract]);
    }

    #[test]
    fn bytes_preserve_position() {
        let original = checkpoint();
        let restored = Checkpoint::<Phase>::from_bytes(&original.to_bytes().unwrap()).unwrap();

        assert_eq!(restored.state, original.state);
        assert_eq!(restored.id, original.id);
        assert_eq!(restored.history.total_attempts(), 2);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut stale = checkpoint();
        stale.version = CHECKPOINT_VERSION + 1;
        let json = stale.to_json().unwrap();

        let err = Checkpoint::<Phase>::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            CheckpointError::UnsupportedVersion { found, supported }
                if found == CHECKPOINT_VERSION + 1 && supported == CHECKPOINT_VERSION
        ));
    }

    #[test]
    fn garbage_fails_to_deserialize() {
        let err = Checkpoint::<Phase>::from_json("{\"version\": 1}").unwrap_err();
        assert!(matches!(err, CheckpointError::DeserializationFailed(_)));

        let err = Checkpoint::<Phase>::from_bytes(&[0xff, 0x01]).unwrap_err();
        assert!(matches!(err, CheckpointError::DeserializationFailed(_)));
    }
}
