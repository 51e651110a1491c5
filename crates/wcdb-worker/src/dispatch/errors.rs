//! Error types for message dispatch.
//!
//! Every variant becomes the `error` string of a `{id, error}` reply. Routing
//! outcomes that the protocol treats as results (unknown selectors) are not
//! errors and never appear here.

use std::io;

use thiserror::Error;

use crate::capability::CapabilityError;

/// Errors surfaced while decoding or handling one request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request carries an id but no usable `type`.
    #[error("invalid request structure: {message}")]
    InvalidStructure { message: String },

    /// The payload does not match the selector's arguments.
    #[error("invalid arguments for {selector}: {source}")]
    InvalidArguments {
        selector: String,
        #[source]
        source: serde_json::Error,
    },

    /// The capability module, constructor or operation failed.
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// The handler for a request panicked.
    #[error("handler for {selector} panicked: {message}")]
    HandlerPanicked { selector: String, message: String },

    /// A handler thread could not be started.
    #[error("failed to spawn handler thread: {0}")]
    Spawn(#[source] io::Error),
}

impl DispatchError {
    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Creates an invalid arguments error.
    pub fn invalid_arguments(selector: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidArguments {
            selector: selector.into(),
            source,
        }
    }

    /// Creates a handler panic error.
    pub fn handler_panicked(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerPanicked {
            selector: selector.into(),
            message: message.into(),
        }
    }
}
