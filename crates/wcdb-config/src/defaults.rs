/// Default log filter expression used by the worker.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Upper bound on a single inbound channel message, in bytes.
///
/// Batch payloads (display names for a whole contact list, aggregate stats
/// across many sessions) run to a few megabytes.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 8 * 1024 * 1024;

/// Default log filter expression used by the worker.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the worker.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Default inbound message size limit.
#[must_use]
pub const fn default_max_message_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_BYTES
}
