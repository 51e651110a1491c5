//! Wire types exchanged between the controller and the database worker.
//!
//! The worker sits behind an isolation boundary and talks to its controller
//! over a single bidirectional channel that delivers discrete messages in
//! order. Every controller request carries a caller-assigned correlation
//! token which the worker echoes verbatim in the matching response. The worker
//! may also push unsolicited monitor events; these carry the reserved
//! [`SENTINEL_ID`] so the controller never mistakes them for a response.
//!
//! ```json
//! {"id":7,"type":"getSessions","payload":{}}
//! {"id":7,"result":{"success":true,"sessions":[]}}
//! {"id":-1,"type":"monitor","payload":{"type":"newMessage","json":"{}"}}
//! ```

mod id;
mod inbound;
mod outbound;

pub use self::id::{RequestId, SENTINEL_ID};
pub use self::inbound::InboundMessage;
pub use self::outbound::{MonitorPayload, MonitorPush, MonitorTag, OutboundMessage};
