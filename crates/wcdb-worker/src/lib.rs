//! Worker side of the database dispatch layer.
//!
//! A controlling process drives long-running, possibly blocking database
//! operations through this worker over a single bidirectional channel. The
//! worker decodes each request, routes it by selector and replies exactly
//! once with the request's own correlation id. Handlers run on their own
//! threads, so replies leave in completion order.
//!
//! The database engine itself is an opaque capability (see [`capability`]).
//! The worker builds one shared instance lazily, the first time a request
//! needs it, and never for configuration-only or health-check requests:
//!
//! - `setPaths` and `setLogEnabled` are recorded and handed to the module
//!   when it next constructs an instance;
//! - `checkHealth` loads the module and probes a throwaway instance that never
//!   reaches the shared slot;
//! - `shutdown` tears the shared instance down so the next request rebuilds
//!   it.
//!
//! Monitor events raised by the instance are relayed as pushes carrying the
//! reserved [`wcdb_protocol::SENTINEL_ID`].
//!
//! [`bootstrap_with`] loads configuration, initialises telemetry and returns a
//! [`Worker`] that serves stdin and stdout or any other
//! [`MessageSource`]/[`MessageSink`] pair.

mod bootstrap;
pub mod capability;
pub mod dispatch;
mod health;
mod instance;
mod module;
mod monitor;
pub mod operations;
mod reporter;
mod settings;
pub mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, StaticConfigLoader, SystemConfigLoader, Worker, bootstrap,
    bootstrap_with,
};
pub use health::{GENERIC_INIT_FAILURE, HEALTHY_MESSAGE, HealthCheck, HealthOutcome};
pub use instance::LazyInstance;
pub use module::ModuleCache;
pub use monitor::MonitorRelay;
pub use reporter::{StructuredWorkerReporter, WorkerReporter};
pub use settings::{DeferredSettings, LogSettings, PathSettings, WorkerSettings};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{MessageSink, MessageSource, TransportError};

#[cfg(test)]
mod tests;
