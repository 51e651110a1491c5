//! Requests sent from the controller to the worker.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::RequestId;

/// A controller request.
///
/// `payload` carries operation-specific arguments keyed by the argument
/// names of the target operation. It may be omitted on the wire, in which
/// case it reads as an empty object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Caller-assigned correlation token.
    pub id: RequestId,
    /// Operation selector.
    #[serde(rename = "type")]
    pub selector: String,
    /// Operation arguments.
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

impl InboundMessage {
    /// Builds a request with an explicit payload.
    #[must_use]
    pub fn new(id: impl Into<RequestId>, selector: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            selector: selector.into(),
            payload,
        }
    }

    /// Builds a request whose payload is an empty object.
    #[must_use]
    pub fn bare(id: impl Into<RequestId>, selector: impl Into<String>) -> Self {
        Self::new(id, selector, empty_payload())
    }
}

fn empty_payload() -> Value {
    Value::Object(Map::new())
}
