//! Request dispatch for the worker side of the channel.
//!
//! ## Protocol
//!
//! The controller sends one JSON object per request:
//!
//! ```json
//! {"id":7,"type":"getMessages","payload":{"sessionId":"wxid_a","limit":50}}
//! ```
//!
//! The worker answers each request exactly once, with either a result or an
//! error, echoing the request's id:
//!
//! ```json
//! {"id":7,"result":{"success":true,"messages":[]}}
//! {"id":8,"error":"execQuery failed: database is locked"}
//! ```
//!
//! Selectors outside the operation table are not errors; they produce
//! `{"success":false,"error":"Unknown method: <type>"}` as the result.

mod errors;
mod handler;
mod request;
mod router;

pub use self::errors::DispatchError;
pub use self::handler::Dispatcher;
pub(crate) use self::handler::panic_message;
pub use self::request::{RejectedFrame, Request};
pub use self::router::{Configuration, Route, Router, unknown_method};
