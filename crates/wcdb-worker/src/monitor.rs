//! Relay for unsolicited monitor events.
//!
//! This is the only place push messages originate. Each callback invocation
//! becomes exactly one `{id: -1, type: "monitor", payload: {type, json}}`
//! message on the outbound sink.

use std::sync::Arc;

use tracing::warn;
use wcdb_protocol::OutboundMessage;

use crate::capability::MonitorCallback;
use crate::transport::{MessageSink, TRANSPORT_TARGET};

/// Builds monitor callbacks bound to the outbound sink.
#[derive(Clone)]
pub struct MonitorRelay {
    sink: Arc<dyn MessageSink>,
}

impl MonitorRelay {
    /// Creates a relay writing to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self { sink }
    }

    /// Sends one push message.
    pub fn push(&self, event_type: &str, json: &str) {
        let message = OutboundMessage::monitor(event_type, json);
        if let Err(error) = self.sink.send(&message) {
            warn!(
                target: TRANSPORT_TARGET,
                %error,
                event_type,
                "failed to relay monitor event"
            );
        }
    }

    /// Returns a callback suitable for [`Capability::set_monitor`].
    ///
    /// [`Capability::set_monitor`]: crate::capability::Capability::set_monitor
    #[must_use]
    pub fn callback(&self) -> MonitorCallback {
        let relay = self.clone();
        Arc::new(move |event_type: &str, json: &str| relay.push(event_type, json))
    }
}

impl std::fmt::Debug for MonitorRelay {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("MonitorRelay").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use mockall::mock;
    use mockall::predicate::always;

    use super::*;
    use crate::transport::{ChannelSink, TransportError};

    mock! {
        Sink {}
        impl MessageSink for Sink {
            fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;
        }
    }

    #[test]
    fn each_invocation_sends_one_sentinel_push() {
        let (sender, receiver) = mpsc::channel();
        let relay = MonitorRelay::new(Arc::new(ChannelSink::new(sender)));
        let callback = relay.callback();

        callback("newMessage", r#"{"sessionId":"wxid_a"}"#);
        callback("sessionChanged", "{}");

        let first = receiver.try_recv().expect("first push");
        assert!(first.is_push());
        assert!(first.id().is_sentinel());
        assert_eq!(
            first,
            OutboundMessage::monitor("newMessage", r#"{"sessionId":"wxid_a"}"#)
        );
        assert_eq!(
            receiver.try_recv().expect("second push"),
            OutboundMessage::monitor("sessionChanged", "{}")
        );
        assert!(receiver.try_recv().is_err(), "no extra pushes");
    }

    #[test]
    fn send_failures_do_not_reach_the_caller() {
        let mut sink = MockSink::new();
        sink.expect_send()
            .with(always())
            .times(1)
            .returning(|_| Err(TransportError::Disconnected));
        let relay = MonitorRelay::new(Arc::new(sink));

        relay.callback()("newMessage", "{}");
    }
}
