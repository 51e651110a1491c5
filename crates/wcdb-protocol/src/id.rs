//! Correlation tokens linking requests to responses.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved correlation value marking an unsolicited push.
pub const SENTINEL_ID: i64 = -1;

/// Opaque, caller-assigned correlation token.
///
/// The worker never interprets the token; it only echoes it. Any JSON value
/// is accepted so controllers may use numbers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Value);

impl RequestId {
    /// Wraps an arbitrary JSON value as a correlation token.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the reserved push token.
    #[must_use]
    pub fn sentinel() -> Self {
        Self(Value::from(SENTINEL_ID))
    }

    /// Returns `true` when the token equals the reserved push token.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.0.as_i64() == Some(SENTINEL_ID)
    }

    /// Returns the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<i32> for RequestId {
    fn from(value: i32) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(text) => formatter.write_str(text),
            other => write!(formatter, "{other}"),
        }
    }
}
