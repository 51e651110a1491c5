//! Errors raised by the capability implementation and its module.
//!
//! Construction failures are shared between every caller waiting on the same
//! construction attempt, so the error is cheap to clone and carries its
//! context as text rather than as a boxed source.

use thiserror::Error;

/// Failures reported by the capability module or instance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    /// The implementation module could not be loaded.
    #[error("failed to load capability module: {message}")]
    Load {
        /// Loader-provided description.
        message: String,
    },

    /// The module loaded but refused to build an instance.
    #[error("failed to construct capability instance: {message}")]
    Construct {
        /// Constructor-provided description.
        message: String,
    },

    /// The construction attempt ended without producing an outcome.
    #[error("capability construction aborted before completion")]
    ConstructionAborted,

    /// A domain operation failed.
    #[error("{operation} failed: {message}")]
    Operation {
        /// Selector of the failing operation.
        operation: String,
        /// Operation-provided description.
        message: String,
    },

    /// The instance does not implement the requested operation.
    #[error("{operation} is not supported by this capability")]
    Unsupported {
        /// Selector of the missing operation.
        operation: String,
    },
}

impl CapabilityError {
    /// Creates a module load error.
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
        }
    }

    /// Creates a construction error.
    pub fn construct(message: impl Into<String>) -> Self {
        Self::Construct {
            message: message.into(),
        }
    }

    /// Creates an operation error.
    pub fn operation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported-operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        assert_eq!(
            CapabilityError::load("wcdb.dll not found").to_string(),
            "failed to load capability module: wcdb.dll not found"
        );
        assert_eq!(
            CapabilityError::operation("getSessions", "database locked").to_string(),
            "getSessions failed: database locked"
        );
        assert_eq!(
            CapabilityError::unsupported("verifyUser").to_string(),
            "verifyUser is not supported by this capability"
        );
    }
}
