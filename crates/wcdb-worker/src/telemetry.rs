//! Structured telemetry initialisation for the worker.
//!
//! Diagnostics go to stderr. Stdout belongs to the controller channel and
//! must only ever carry protocol messages, one JSON object per line; a single
//! stray diagnostic line there desynchronises the controller's reader.
//!
//! Every event is emitted under a `wcdb_worker::<area>` target (`dispatch`,
//! `instance`, `module`, `health`, `operations`, `transport`, `lifecycle`),
//! so `WCDB_LOG_FILTER=wcdb_worker::instance=debug` narrows output to one
//! area. Handler threads are named `wcdb-handler-<n>` and the name is
//! recorded on each event, which is the only way to tell concurrent requests
//! apart in the log.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use wcdb_config::{Config, LogFormat};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Later calls return a fresh [`TelemetryHandle`] without touching the
/// global state again.
///
/// # Examples
///
/// ```rust
/// use wcdb_config::Config;
/// use wcdb_worker::telemetry;
///
/// # fn main() -> Result<(), wcdb_worker::telemetry::TelemetryError> {
/// let config = Config::default();
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// drop(first);
/// drop(second);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter and
/// [`TelemetryError::Subscriber`] when another global subscriber is already
/// installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing::Event;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::module::ModuleCache;
    use crate::reporter::{StructuredWorkerReporter, WorkerReporter};
    use crate::tests::support::{FakeLoader, FakeModule};

    #[derive(Clone, Default)]
    struct TargetRecorder(Arc<Mutex<Vec<String>>>);

    impl TargetRecorder {
        fn targets(&self) -> Vec<String> {
            self.0.lock().expect("targets mutex").clone()
        }
    }

    impl<S: Subscriber> Layer<S> for TargetRecorder {
        fn on_event(&self, event: &Event<'_>, _context: Context<'_, S>) {
            self.0
                .lock()
                .expect("targets mutex")
                .push(event.metadata().target().to_owned());
        }
    }

    #[test]
    fn invalid_filters_are_rejected_before_installation() {
        let config = Config {
            log_filter: "wcdb_worker=verbose".to_owned(),
            ..Config::default()
        };
        let error = install_subscriber(&config).expect_err("filter is invalid");
        assert!(matches!(error, TelemetryError::Filter(_)));
    }

    #[test]
    fn crate_filter_directive_selects_worker_events() {
        let recorder = TargetRecorder::default();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("wcdb_worker=debug"))
            .with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            let module = FakeModule::new();
            let cache = ModuleCache::new(Box::new(FakeLoader::new(&module)));
            assert!(cache.get_or_load().is_ok());
            StructuredWorkerReporter::new().instance_ready();
            tracing::info!(target: "unrelated", "filtered out");
        });

        let targets = recorder.targets();
        assert!(targets.contains(&"wcdb_worker::module".to_owned()), "{targets:?}");
        assert!(targets.contains(&"wcdb_worker::lifecycle".to_owned()), "{targets:?}");
        assert!(!targets.iter().any(|target| target == "unrelated"), "{targets:?}");
    }
}
