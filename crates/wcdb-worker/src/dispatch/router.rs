//! Selector routing and request execution.
//!
//! Every request falls into one of four routes. Configuration selectors only
//! record settings. `checkHealth` runs the isolated probe. `shutdown` tears
//! the shared instance down. Everything else needs the instance and is
//! resolved against the operation table.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::errors::DispatchError;
use super::request::Request;
use crate::health::HealthCheck;
use crate::instance::LazyInstance;
use crate::monitor::MonitorRelay;
use crate::operations::Operation;
use crate::settings::{DeferredSettings, LogSettings, PathSettings};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::dispatch");

/// Settings carried by a configuration-only selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Configuration {
    /// `setPaths`
    Paths(PathSettings),
    /// `setLogEnabled`
    Logging(LogSettings),
    /// A configuration payload that could not be read. Nothing is recorded.
    Ignored,
}

/// How a request is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Record settings and acknowledge.
    Configure(Configuration),
    /// Run the isolated health check.
    CheckHealth,
    /// Shut the shared instance down.
    Teardown,
    /// Invoke an operation on the shared instance.
    Invoke,
}

impl Route {
    /// Classifies a request by selector.
    ///
    /// Configuration selectors always classify as [`Route::Configure`]. An
    /// unreadable configuration payload becomes [`Configuration::Ignored`].
    #[must_use]
    pub fn classify(request: &Request) -> Self {
        match request.selector.as_str() {
            "setPaths" => Self::Configure(configuration(request, Configuration::Paths)),
            "setLogEnabled" => Self::Configure(configuration(request, Configuration::Logging)),
            "checkHealth" => Self::CheckHealth,
            "shutdown" => Self::Teardown,
            _ => Self::Invoke,
        }
    }

    /// Returns `true` for routes handled on the receive loop itself.
    ///
    /// Configuration is applied in arrival order so it is recorded before any
    /// later message is routed.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Configure(_))
    }
}

fn configuration<T: DeserializeOwned>(
    request: &Request,
    record: fn(T) -> Configuration,
) -> Configuration {
    match serde_json::from_value(request.payload.clone()) {
        Ok(settings) => record(settings),
        Err(error) => {
            warn!(
                target: DISPATCH_TARGET,
                id = %request.id,
                selector = %request.selector,
                %error,
                "ignoring unreadable configuration"
            );
            Configuration::Ignored
        }
    }
}

/// Result returned for a selector outside the operation table.
#[must_use]
pub fn unknown_method(selector: &str) -> Value {
    json!({"success": false, "error": format!("Unknown method: {selector}")})
}

/// Executes routed requests against the worker's shared state.
#[derive(Debug)]
pub struct Router {
    settings: Arc<DeferredSettings>,
    instance: Arc<LazyInstance>,
    health: HealthCheck,
    relay: MonitorRelay,
}

impl Router {
    /// Creates a router over the worker's shared state.
    #[must_use]
    pub fn new(
        settings: Arc<DeferredSettings>,
        instance: Arc<LazyInstance>,
        health: HealthCheck,
        relay: MonitorRelay,
    ) -> Self {
        Self {
            settings,
            instance,
            health,
            relay,
        }
    }

    /// Executes `request` along `route` and returns the reply's `result`.
    ///
    /// # Errors
    ///
    /// Returns instance construction, argument decoding and operation
    /// failures.
    pub fn execute(&self, route: Route, request: Request) -> Result<Value, DispatchError> {
        debug!(
            target: DISPATCH_TARGET,
            id = %request.id,
            selector = %request.selector,
            "executing request"
        );
        match route {
            Route::Configure(Configuration::Paths(paths)) => {
                self.settings.apply_paths(paths);
                Ok(success())
            }
            Route::Configure(Configuration::Logging(logging)) => {
                self.settings.apply_logging(logging);
                Ok(success())
            }
            Route::Configure(Configuration::Ignored) => Ok(success()),
            Route::CheckHealth => Ok(self.health.run().to_result()),
            Route::Teardown => {
                self.teardown_instance();
                Ok(success())
            }
            Route::Invoke => self.invoke(request),
        }
    }

    /// Shuts the shared instance down if one exists.
    pub fn teardown_instance(&self) {
        if !self.instance.teardown() {
            debug!(target: DISPATCH_TARGET, "no capability instance to tear down");
        }
    }

    fn invoke(&self, request: Request) -> Result<Value, DispatchError> {
        let instance = self.instance.get_or_create()?;
        let Some(operation) = Operation::decode(&request.selector, request.payload)? else {
            debug!(
                target: DISPATCH_TARGET,
                selector = %request.selector,
                "unknown selector"
            );
            return Ok(unknown_method(&request.selector));
        };
        Ok(operation.invoke(instance.as_ref(), &self.relay)?)
    }
}

fn success() -> Value {
    json!({"success": true})
}
