//! Messages sent from the worker back to the controller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RequestId;

/// Messages written to the channel by the worker.
///
/// Responses are correlated by id. Monitor pushes carry the sentinel id and
/// are unordered relative to everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    /// Unsolicited event raised by the capability instance.
    Monitor(MonitorPush),
    /// Successful completion of a request.
    Response {
        /// Token copied from the request.
        id: RequestId,
        /// Operation-defined result payload.
        result: Value,
    },
    /// Failure raised while handling a request.
    Failure {
        /// Token copied from the request.
        id: RequestId,
        /// Stringified failure.
        error: String,
    },
}

impl OutboundMessage {
    /// Creates a success response.
    #[must_use]
    pub const fn result(id: RequestId, result: Value) -> Self {
        Self::Response { id, result }
    }

    /// Creates an error response.
    #[must_use]
    pub fn error(id: RequestId, error: impl Into<String>) -> Self {
        Self::Failure {
            id,
            error: error.into(),
        }
    }

    /// Creates a monitor push for the given event kind and serialised data.
    #[must_use]
    pub fn monitor(event_type: impl Into<String>, json: impl Into<String>) -> Self {
        Self::Monitor(MonitorPush::new(event_type, json))
    }

    /// Returns the correlation token carried by the message.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        match self {
            Self::Monitor(push) => &push.id,
            Self::Response { id, .. } | Self::Failure { id, .. } => id,
        }
    }

    /// Returns `true` for unsolicited pushes.
    #[must_use]
    pub const fn is_push(&self) -> bool {
        matches!(self, Self::Monitor(_))
    }
}

/// Marker serialised as `"monitor"` in the `type` field of a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorTag {
    /// The only push kind defined by the protocol.
    Monitor,
}

/// Unsolicited monitor event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorPush {
    /// Always the sentinel id.
    pub id: RequestId,
    /// Push discriminator.
    #[serde(rename = "type")]
    pub tag: MonitorTag,
    /// Event data as reported by the capability instance.
    pub payload: MonitorPayload,
}

impl MonitorPush {
    /// Builds a push carrying the sentinel id.
    #[must_use]
    pub fn new(event_type: impl Into<String>, json: impl Into<String>) -> Self {
        Self {
            id: RequestId::sentinel(),
            tag: MonitorTag::Monitor,
            payload: MonitorPayload {
                event_type: event_type.into(),
                json: json.into(),
            },
        }
    }
}

/// Event kind and serialised event data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorPayload {
    /// Event kind, for example `newMessage`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event data, already serialised by the capability instance.
    pub json: String,
}
