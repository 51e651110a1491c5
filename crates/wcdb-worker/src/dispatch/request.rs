//! Decoding of inbound frames into requests.
//!
//! A frame that carries no correlation id cannot be answered; it is rejected
//! as uncorrelated and the caller logs and drops it. Any other decoding
//! failure still knows its id and is answered with an error reply.

use serde_json::{Map, Value};
use wcdb_protocol::{InboundMessage, RequestId};

use super::errors::DispatchError;

/// A request ready for routing.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Token to echo in the reply.
    pub id: RequestId,
    /// Operation selector.
    pub selector: String,
    /// Arguments object; `{}` when the frame carried none.
    pub payload: Value,
}

/// Why a frame could not become a [`Request`].
#[derive(Debug)]
pub enum RejectedFrame {
    /// No id to reply to.
    Uncorrelated { reason: &'static str },
    /// The id is known, so the failure is replied to.
    Invalid { id: RequestId, error: DispatchError },
}

impl Request {
    /// Decodes one inbound frame.
    ///
    /// # Errors
    ///
    /// Returns [`RejectedFrame::Uncorrelated`] when the frame is not an object
    /// or lacks an id, and [`RejectedFrame::Invalid`] when the `type` field is
    /// missing or not a string.
    pub fn from_frame(frame: Value) -> Result<Self, RejectedFrame> {
        let Some(object) = frame.as_object() else {
            return Err(RejectedFrame::Uncorrelated {
                reason: "frame is not a JSON object",
            });
        };
        let id = match object.get("id") {
            None | Some(Value::Null) => {
                return Err(RejectedFrame::Uncorrelated {
                    reason: "frame carries no id",
                });
            }
            Some(id) => RequestId::new(id.clone()),
        };

        let message: InboundMessage =
            serde_json::from_value(frame).map_err(|error| RejectedFrame::Invalid {
                id,
                error: DispatchError::invalid_structure(error.to_string()),
            })?;

        let payload = match message.payload {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Ok(Self {
            id: message.id,
            selector: message.selector,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_a_complete_frame() {
        let request = Request::from_frame(json!({
            "id": "req-1",
            "type": "getMessages",
            "payload": {"sessionId": "s"}
        }))
        .expect("valid frame");

        assert_eq!(request.id, RequestId::from("req-1"));
        assert_eq!(request.selector, "getMessages");
        assert_eq!(request.payload, json!({"sessionId": "s"}));
    }

    #[rstest]
    #[case::missing(json!({"id": 3, "type": "getSessions"}))]
    #[case::null(json!({"id": 3, "type": "getSessions", "payload": null}))]
    fn absent_payload_reads_as_empty_object(#[case] frame: Value) {
        let request = Request::from_frame(frame).expect("valid frame");
        assert_eq!(request.payload, json!({}));
    }

    #[rstest]
    #[case::array(json!([1, 2]))]
    #[case::scalar(json!("getSessions"))]
    #[case::missing_id(json!({"type": "getSessions"}))]
    #[case::null_id(json!({"id": null, "type": "getSessions"}))]
    fn frames_without_id_are_uncorrelated(#[case] frame: Value) {
        let rejected = Request::from_frame(frame).expect_err("rejected");
        assert!(matches!(rejected, RejectedFrame::Uncorrelated { .. }));
    }

    #[rstest]
    #[case::missing_type(json!({"id": 5}))]
    #[case::numeric_type(json!({"id": 5, "type": 12}))]
    fn bad_type_is_answered(#[case] frame: Value) {
        let rejected = Request::from_frame(frame).expect_err("rejected");
        let RejectedFrame::Invalid { id, error } = rejected else {
            panic!("expected an answerable rejection");
        };
        assert_eq!(id, RequestId::from(5));
        assert!(matches!(error, DispatchError::InvalidStructure { .. }));
        assert!(error.to_string().starts_with("invalid request structure: "));
    }
}
