//! Outbound half of the controller channel.

use std::io::Write;
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};

use wcdb_protocol::OutboundMessage;

use super::errors::TransportError;

/// Thread-safe sender of outbound messages.
///
/// Handler threads and the monitor relay share one sink, so implementations
/// must deliver each message whole.
pub trait MessageSink: Send + Sync {
    /// Sends one message to the controller.
    ///
    /// # Errors
    ///
    /// Returns an error when the message cannot be serialised or the channel
    /// is gone.
    fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;
}

/// Writes each message as a single JSON line.
#[derive(Debug)]
pub struct JsonlSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonlSink<W> {
    /// Wraps a writer (stdout in production).
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> MessageSink for JsonlSink<W> {
    fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let mut line = serde_json::to_vec(message)
            .map_err(|source| TransportError::Serialize { source })?;
        line.push(b'\n');

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }
}

/// Delivers messages over an in-process channel.
#[derive(Debug)]
pub struct ChannelSink {
    sender: Mutex<Sender<OutboundMessage>>,
}

impl ChannelSink {
    /// Wraps the sending half of an `mpsc` channel.
    #[must_use]
    pub fn new(sender: Sender<OutboundMessage>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl MessageSink for ChannelSink {
    fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .send(message.clone())
            .map_err(|_| TransportError::Disconnected)
    }
}
