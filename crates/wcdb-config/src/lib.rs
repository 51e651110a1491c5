//! Shared configuration for the database worker.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, an
//! optional configuration file (`--config-path` or `WCDB_CONFIG_PATH`),
//! `WCDB_*` environment variables, and finally command-line flags. Later
//! layers win.
//!
//! Only settings that shape the worker process itself live here. Paths and
//! the capability's own logging switch are not configuration: the controller
//! sends them over the channel (`setPaths`, `setLogEnabled`) and the worker
//! hands them to the capability when it is constructed.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_MESSAGE_BYTES, default_log_filter, default_log_filter_string,
    default_log_format, default_max_message_bytes,
};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Resolved worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WCDB")]
pub struct Config {
    /// `tracing` filter expression applied to worker diagnostics.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for worker diagnostics.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Largest inbound message accepted from the channel.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Config {
    /// Filter expression used to initialise telemetry.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Diagnostic output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Largest inbound message accepted from the channel.
    #[must_use]
    pub const fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}
