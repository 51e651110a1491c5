//! Worker bootstrap orchestration.

use std::io::{self, BufReader};
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use wcdb_config::Config;

use crate::capability::ModuleLoader;
use crate::dispatch::{Dispatcher, Router};
use crate::health::HealthCheck;
use crate::instance::LazyInstance;
use crate::module::ModuleCache;
use crate::monitor::MonitorRelay;
use crate::reporter::{StructuredWorkerReporter, WorkerReporter};
use crate::settings::DeferredSettings;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{JsonlSink, JsonlSource, MessageSink, MessageSource, TransportError};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the worker configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when no valid configuration can be built.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a fixed configuration, for embedders and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// Result of a successful bootstrap invocation.
///
/// Owns the state shared by every dispatcher built from it: the deferred
/// settings, the module cache and the lazy capability instance.
pub struct Worker {
    config: Config,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn WorkerReporter>,
    settings: Arc<DeferredSettings>,
    modules: Arc<ModuleCache>,
    instance: Arc<LazyInstance>,
}

impl Worker {
    pub(crate) fn assemble(
        config: Config,
        telemetry: TelemetryHandle,
        reporter: Arc<dyn WorkerReporter>,
        loader: Box<dyn ModuleLoader>,
    ) -> Self {
        let settings = Arc::new(DeferredSettings::new());
        let modules = Arc::new(ModuleCache::new(loader));
        let instance = Arc::new(LazyInstance::new(
            Arc::clone(&modules),
            Arc::clone(&settings),
            Arc::clone(&reporter),
        ));
        Self {
            config,
            telemetry,
            reporter,
            settings,
            modules,
            instance,
        }
    }

    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Returns `true` while an operational capability instance exists.
    #[must_use]
    pub fn has_instance(&self) -> bool {
        self.instance.current().is_some()
    }

    /// Builds a dispatcher whose replies and monitor pushes go to `sink`.
    #[must_use]
    pub fn dispatcher(&self, sink: Arc<dyn MessageSink>) -> Dispatcher {
        let health = HealthCheck::new(
            Arc::clone(&self.modules),
            Arc::clone(&self.settings),
            Arc::clone(&self.reporter),
        );
        let router = Router::new(
            Arc::clone(&self.settings),
            Arc::clone(&self.instance),
            health,
            MonitorRelay::new(Arc::clone(&sink)),
        );
        Dispatcher::new(router, sink)
    }

    /// Serves `source` until the controller closes it.
    ///
    /// # Errors
    ///
    /// Returns the transport error that ended the session early.
    pub fn serve(
        &self,
        source: &mut dyn MessageSource,
        sink: Arc<dyn MessageSink>,
    ) -> Result<(), TransportError> {
        self.dispatcher(sink).run(source)
    }

    /// Serves newline-delimited JSON over stdin and stdout.
    ///
    /// # Errors
    ///
    /// Returns the transport error that ended the session early.
    pub fn run_stdio(&self) -> Result<(), TransportError> {
        let mut source = JsonlSource::new(
            BufReader::new(io::stdin()),
            self.config.max_message_bytes(),
        );
        let sink = Arc::new(JsonlSink::new(io::stdout()));
        self.serve(&mut source, sink)
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Worker")
            .field("config", &self.config)
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

/// Bootstraps the worker using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration or telemetry cannot be set
/// up. The reporter observes the failure before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn WorkerReporter>,
    modules: Box<dyn ModuleLoader>,
) -> Result<Worker, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    Ok(Worker::assemble(config, telemetry, reporter, modules))
}

/// Bootstraps the worker from the process environment with structured
/// lifecycle reporting.
///
/// # Errors
///
/// See [`bootstrap_with`].
pub fn bootstrap(modules: Box<dyn ModuleLoader>) -> Result<Worker, BootstrapError> {
    bootstrap_with(
        &SystemConfigLoader,
        Arc::new(StructuredWorkerReporter::new()),
        modules,
    )
}
