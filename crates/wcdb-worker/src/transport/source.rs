//! Inbound half of the controller channel.

use std::io::{self, BufRead};
use std::sync::mpsc::Receiver;

use serde_json::Value;

use super::errors::TransportError;

/// Ordered source of inbound frames.
pub trait MessageSource: Send {
    /// Blocks until the next frame arrives.
    ///
    /// Returns `Ok(None)` once the controller has closed the channel.
    ///
    /// # Errors
    ///
    /// Returns a non-fatal error for a frame that must be skipped and a fatal
    /// one (see [`TransportError::is_fatal`]) when the channel is unusable.
    fn recv(&mut self) -> Result<Option<Value>, TransportError>;
}

/// Reads newline-delimited JSON frames, bounded in size.
#[derive(Debug)]
pub struct JsonlSource<R> {
    reader: R,
    max_message_bytes: usize,
}

impl<R: BufRead + Send> JsonlSource<R> {
    /// Wraps a buffered reader (stdin in production).
    #[must_use]
    pub const fn new(reader: R, max_message_bytes: usize) -> Self {
        Self {
            reader,
            max_message_bytes,
        }
    }

    /// Reads one line without its delimiter.
    ///
    /// An oversized line is consumed in full so the next call starts at the
    /// following frame.
    fn read_line(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut line = Vec::new();
        let mut size = 0_usize;
        let mut consumed_any = false;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            };
            if available.is_empty() {
                if !consumed_any {
                    return Ok(None);
                }
                break;
            }

            let newline = available.iter().position(|byte| *byte == b'\n');
            let content = newline.unwrap_or(available.len());
            let chunk = available.get(..content).unwrap_or_default();
            size = size.saturating_add(chunk.len());
            if size <= self.max_message_bytes {
                line.extend_from_slice(chunk);
            }

            let used = newline.map_or(content, |_| content + 1);
            self.reader.consume(used);
            consumed_any = true;
            if newline.is_some() {
                break;
            }
        }

        if size > self.max_message_bytes {
            return Err(TransportError::MessageTooLarge {
                size,
                max: self.max_message_bytes,
            });
        }
        Ok(Some(line))
    }
}

impl<R: BufRead + Send> MessageSource for JsonlSource<R> {
    fn recv(&mut self) -> Result<Option<Value>, TransportError> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return serde_json::from_slice(&line)
                .map(Some)
                .map_err(|source| TransportError::Malformed { source });
        }
    }
}

/// Receives frames over an in-process channel.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: Receiver<Value>,
}

impl ChannelSource {
    /// Wraps the receiving half of an `mpsc` channel.
    #[must_use]
    pub const fn new(receiver: Receiver<Value>) -> Self {
        Self { receiver }
    }
}

impl MessageSource for ChannelSource {
    fn recv(&mut self) -> Result<Option<Value>, TransportError> {
        Ok(self.receiver.recv().ok())
    }
}
