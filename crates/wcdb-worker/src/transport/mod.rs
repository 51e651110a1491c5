//! Channel between the controller and the worker.
//!
//! The channel carries discrete JSON messages in order. Production wiring
//! uses newline-delimited JSON over stdin and stdout; in-process embedders and
//! tests use `mpsc` channels instead.

mod errors;
mod sink;
mod source;

pub use self::errors::TransportError;
pub use self::sink::{ChannelSink, JsonlSink, MessageSink};
pub use self::source::{ChannelSource, JsonlSource, MessageSource};

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::transport");
