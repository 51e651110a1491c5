//! Structured reporting for worker lifecycle events.

use std::sync::Arc;

use wcdb_config::Config;

use crate::bootstrap::BootstrapError;
use crate::capability::CapabilityError;
use crate::health::HealthOutcome;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::lifecycle");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait WorkerReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked before the shared capability instance is constructed.
    fn instance_constructing(&self);

    /// Invoked after the shared capability instance is ready.
    fn instance_ready(&self);

    /// Invoked when constructing the shared capability instance fails.
    fn instance_failed(&self, error: &CapabilityError);

    /// Invoked after the shared capability instance has been shut down.
    fn instance_torn_down(&self);

    /// Invoked when a health check completes.
    fn health_checked(&self, outcome: &HealthOutcome);
}

impl<T> WorkerReporter for Arc<T>
where
    T: WorkerReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn instance_constructing(&self) {
        (**self).instance_constructing();
    }

    fn instance_ready(&self) {
        (**self).instance_ready();
    }

    fn instance_failed(&self, error: &CapabilityError) {
        (**self).instance_failed(error);
    }

    fn instance_torn_down(&self) {
        (**self).instance_torn_down();
    }

    fn health_checked(&self, outcome: &HealthOutcome) {
        (**self).health_checked(outcome);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredWorkerReporter;

impl StructuredWorkerReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl WorkerReporter for StructuredWorkerReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_starting",
            "starting worker bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_succeeded",
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            max_message_bytes = config.max_message_bytes(),
            "worker bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "worker bootstrap failed"
        );
    }

    fn instance_constructing(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "instance_constructing",
            "constructing capability instance"
        );
    }

    fn instance_ready(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "instance_ready",
            "capability instance ready"
        );
    }

    fn instance_failed(&self, error: &CapabilityError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "instance_failed",
            error = %error,
            "capability instance construction failed"
        );
    }

    fn instance_torn_down(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "instance_torn_down",
            "capability instance shut down"
        );
    }

    fn health_checked(&self, outcome: &HealthOutcome) {
        match outcome {
            HealthOutcome::Healthy { message } => tracing::info!(
                target: LIFECYCLE_TARGET,
                event = "health_checked",
                healthy = true,
                message = %message,
                "health check passed"
            ),
            HealthOutcome::Unhealthy { error } | HealthOutcome::Failed { error } => {
                tracing::warn!(
                    target: LIFECYCLE_TARGET,
                    event = "health_checked",
                    healthy = false,
                    error = %error,
                    "health check failed"
                );
            }
        }
    }
}
