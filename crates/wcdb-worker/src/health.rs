//! Isolated health check for the capability implementation.
//!
//! The check answers "can the implementation be loaded and initialised?"
//! without disturbing the operational instance. It reuses the shared module
//! cache but always builds its own throwaway instance, which never reaches
//! the lazy instance slot. A panic raised while probing is reported as a
//! failed check.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use crate::capability::CapabilityError;
use crate::dispatch::panic_message;
use crate::module::ModuleCache;
use crate::reporter::WorkerReporter;
use crate::settings::DeferredSettings;

const HEALTH_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::health");

/// Message returned when the throwaway instance initialised.
pub const HEALTHY_MESSAGE: &str = "native library loaded";

/// Error returned when initialisation failed without a recorded reason.
pub const GENERIC_INIT_FAILURE: &str = "native library initialisation failed";

/// Result of one health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthOutcome {
    /// The instance initialised and was shut down again.
    Healthy {
        /// Informational message.
        message: String,
    },
    /// Initialisation reported failure.
    Unhealthy {
        /// Recorded failure reason, or a generic message.
        error: String,
    },
    /// Loading, construction or initialisation raised an error.
    Failed {
        /// Stringified failure.
        error: String,
    },
}

impl HealthOutcome {
    /// Returns `true` for [`HealthOutcome::Healthy`].
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }

    /// Renders the outcome as the `result` of a `checkHealth` response.
    #[must_use]
    pub fn to_result(&self) -> Value {
        match self {
            Self::Healthy { message } => json!({"success": true, "message": message}),
            Self::Unhealthy { error } | Self::Failed { error } => {
                json!({"success": false, "error": error})
            }
        }
    }
}

/// Runs the health-check sequence against the shared module cache.
pub struct HealthCheck {
    modules: Arc<ModuleCache>,
    settings: Arc<DeferredSettings>,
    reporter: Arc<dyn WorkerReporter>,
}

impl std::fmt::Debug for HealthCheck {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HealthCheck")
            .field("modules", &self.modules)
            .finish_non_exhaustive()
    }
}

impl HealthCheck {
    /// Creates a health check over the shared collaborators.
    #[must_use]
    pub fn new(
        modules: Arc<ModuleCache>,
        settings: Arc<DeferredSettings>,
        reporter: Arc<dyn WorkerReporter>,
    ) -> Self {
        Self {
            modules,
            settings,
            reporter,
        }
    }

    /// Loads the module, builds and initialises a throwaway instance, and
    /// tears it down again.
    pub fn run(&self) -> HealthOutcome {
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.probe())) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(error)) => HealthOutcome::Failed {
                error: error.to_string(),
            },
            Err(payload) => HealthOutcome::Failed {
                error: format!("health check panicked: {}", panic_message(payload.as_ref())),
            },
        };
        self.reporter.health_checked(&outcome);
        outcome
    }

    fn probe(&self) -> Result<HealthOutcome, CapabilityError> {
        let module = self.modules.get_or_load()?;
        let probe = module.construct(&self.settings.snapshot())?;
        debug!(target: HEALTH_TARGET, "initialising throwaway instance");
        let initialised = probe.initialize()?;
        probe.shutdown();

        if initialised {
            return Ok(HealthOutcome::Healthy {
                message: HEALTHY_MESSAGE.to_owned(),
            });
        }
        let error = module
            .last_init_error()
            .filter(|detail| !detail.trim().is_empty())
            .unwrap_or_else(|| GENERIC_INIT_FAILURE.to_owned());
        Ok(HealthOutcome::Unhealthy { error })
    }
}
