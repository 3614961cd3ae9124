//! Errors from encoding, decoding and validating checkpoints.

use thiserror::Error;

/// Why a checkpoint could not be written or used to resume a machine.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The encoder rejected the state or history; carries its message.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Input was not a checkpoint for this state type.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Written with a format this build cannot resume from.
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
