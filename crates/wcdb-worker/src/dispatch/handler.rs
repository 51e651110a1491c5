//! Receive loop and handler threads.
//!
//! The loop reads frames in arrival order and routes each one. Configuration
//! selectors are applied on the loop; every other request runs on its own
//! named handler thread so a slow operation never blocks receipt. Replies
//! therefore leave in completion order, each tagged with its request's id.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde_json::Value;
use tracing::{debug, info, warn};
use wcdb_protocol::{OutboundMessage, RequestId};

use super::errors::DispatchError;
use super::request::{RejectedFrame, Request};
use super::router::{DISPATCH_TARGET, Route, Router};
use crate::transport::{MessageSink, MessageSource, TRANSPORT_TARGET, TransportError};

/// Drives the worker side of the channel.
pub struct Dispatcher {
    router: Arc<Router>,
    sink: Arc<dyn MessageSink>,
    handlers: Vec<JoinHandle<()>>,
    spawned: u64,
}

impl Dispatcher {
    /// Creates a dispatcher replying through `sink`.
    #[must_use]
    pub fn new(router: Router, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            router: Arc::new(router),
            sink,
            handlers: Vec::new(),
            spawned: 0,
        }
    }

    /// Serves `source` until the controller closes the channel.
    ///
    /// On end of input the loop stops accepting, waits for every in-flight
    /// handler to reply and shuts the capability instance down.
    ///
    /// # Errors
    ///
    /// Returns the transport error that made the channel unusable. Handlers
    /// are still drained and the instance shut down first.
    pub fn run(&mut self, source: &mut dyn MessageSource) -> Result<(), TransportError> {
        info!(target: DISPATCH_TARGET, "dispatcher started");
        let outcome = loop {
            match source.recv() {
                Ok(Some(frame)) => self.accept(frame),
                Ok(None) => break Ok(()),
                Err(error) if error.is_fatal() => break Err(error),
                Err(error) => {
                    warn!(target: TRANSPORT_TARGET, %error, "skipping unreadable message");
                }
            }
            self.reap();
        };
        self.shutdown();
        info!(target: DISPATCH_TARGET, "dispatcher stopped");
        outcome
    }

    /// Routes one inbound frame.
    pub fn accept(&mut self, frame: Value) {
        let request = match Request::from_frame(frame) {
            Ok(request) => request,
            Err(RejectedFrame::Uncorrelated { reason }) => {
                warn!(target: DISPATCH_TARGET, reason, "dropping uncorrelated message");
                return;
            }
            Err(RejectedFrame::Invalid { id, error }) => {
                warn!(target: DISPATCH_TARGET, %id, %error, "rejecting malformed request");
                reply(self.sink.as_ref(), id, Err(error));
                return;
            }
        };
        if request.id.is_sentinel() {
            warn!(
                target: DISPATCH_TARGET,
                selector = %request.selector,
                "request uses the reserved push id"
            );
        }

        let route = Route::classify(&request);
        if route.is_inline() {
            let id = request.id.clone();
            let outcome = self.router.execute(route, request);
            reply(self.sink.as_ref(), id, outcome);
            return;
        }
        self.spawn(route, request);
    }

    /// Number of handler threads that have not been joined yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.handlers.len()
    }

    /// Waits for every in-flight handler to finish.
    pub fn drain(&mut self) {
        for handle in self.handlers.drain(..) {
            join_handler(handle);
        }
    }

    /// Drains handlers and shuts the capability instance down.
    pub fn shutdown(&mut self) {
        self.drain();
        self.router.teardown_instance();
    }

    fn spawn(&mut self, route: Route, request: Request) {
        self.spawned += 1;
        let name = format!("wcdb-handler-{}", self.spawned);
        let id = request.id.clone();
        let router = Arc::clone(&self.router);
        let sink = Arc::clone(&self.sink);

        let spawned = thread::Builder::new()
            .name(name)
            .spawn(move || handle_request(&router, sink.as_ref(), route, request));
        match spawned {
            Ok(handle) => self.handlers.push(handle),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "failed to spawn handler thread");
                reply(self.sink.as_ref(), id, Err(DispatchError::Spawn(error)));
            }
        }
    }

    fn reap(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.handlers)
            .into_iter()
            .partition(JoinHandle::is_finished);
        self.handlers = running;
        for handle in finished {
            join_handler(handle);
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Dispatcher")
            .field("router", &self.router)
            .field("in_flight", &self.handlers.len())
            .field("spawned", &self.spawned)
            .finish_non_exhaustive()
    }
}

fn handle_request(router: &Router, sink: &dyn MessageSink, route: Route, request: Request) {
    let id = request.id.clone();
    let selector = request.selector.clone();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| router.execute(route, request)))
        .unwrap_or_else(|payload| {
            Err(DispatchError::handler_panicked(
                selector,
                panic_message(payload.as_ref()),
            ))
        });
    reply(sink, id, outcome);
}

fn reply(sink: &dyn MessageSink, id: RequestId, outcome: Result<Value, DispatchError>) {
    let message = match outcome {
        Ok(result) => OutboundMessage::result(id, result),
        Err(error) => {
            debug!(target: DISPATCH_TARGET, %id, %error, "request failed");
            OutboundMessage::error(id, error.to_string())
        }
    };
    if let Err(error) = sink.send(&message) {
        warn!(target: TRANSPORT_TARGET, %error, "failed to send reply");
    }
}

fn join_handler(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        warn!(target: DISPATCH_TARGET, "handler thread terminated abnormally");
    }
}

/// Extracts the message carried by a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_owned()
}
