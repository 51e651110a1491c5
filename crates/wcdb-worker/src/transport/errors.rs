//! Error types for the controller channel.

use std::io;

use thiserror::Error;

/// Errors surfaced while reading from or writing to the controller channel.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed message: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize outbound message: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    #[error("message too large: {size} bytes exceeds {max} byte limit")]
    MessageTooLarge { size: usize, max: usize },
    #[error("controller channel disconnected")]
    Disconnected,
}

impl TransportError {
    /// Returns `true` when the channel can no longer be used.
    ///
    /// Malformed and oversized messages only affect the offending line; the
    /// receive loop skips them and carries on.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Disconnected)
    }
}
