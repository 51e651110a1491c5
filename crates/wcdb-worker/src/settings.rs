//! Capability settings received before an instance exists.
//!
//! `setPaths` and `setLogEnabled` are acknowledged without touching the
//! capability instance. The values are recorded here and handed to the
//! capability module as a [`WorkerSettings`] snapshot each time it constructs
//! an instance. A live instance is never reconfigured.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;

/// Snapshot of the settings handed to the capability module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Directory holding bundled resources such as the native library.
    pub resources_path: Option<PathBuf>,
    /// Directory where the application keeps per-user data.
    pub user_data_path: Option<PathBuf>,
    /// Whether the capability should keep its own log buffer.
    pub log_enabled: bool,
}

/// Payload of `setPaths`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSettings {
    /// Directory holding bundled resources.
    pub resources_path: Option<PathBuf>,
    /// Directory holding per-user data.
    pub user_data_path: Option<PathBuf>,
}

/// Payload of `setLogEnabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LogSettings {
    /// New value of the capability's logging switch.
    pub enabled: bool,
}

/// Settings store shared by the dispatcher, the lazy instance and the
/// health check.
#[derive(Debug, Default)]
pub struct DeferredSettings {
    inner: Mutex<WorkerSettings>,
}

impl DeferredSettings {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records paths. Fields absent from `paths` keep their previous value.
    pub fn apply_paths(&self, paths: PathSettings) {
        let mut settings = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resources) = paths.resources_path {
            settings.resources_path = Some(resources);
        }
        if let Some(user_data) = paths.user_data_path {
            settings.user_data_path = Some(user_data);
        }
    }

    /// Records the logging switch.
    pub fn apply_logging(&self, logging: LogSettings) {
        let mut settings = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        settings.log_enabled = logging.enabled;
    }

    /// Returns a copy of the settings recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> WorkerSettings {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert_eq!(DeferredSettings::new().snapshot(), WorkerSettings::default());
    }

    #[test]
    fn later_paths_merge_over_earlier_ones() {
        let store = DeferredSettings::new();
        store.apply_paths(PathSettings {
            resources_path: Some(PathBuf::from("/opt/app/resources")),
            user_data_path: Some(PathBuf::from("/home/u/.app")),
        });
        store.apply_paths(PathSettings {
            resources_path: None,
            user_data_path: Some(PathBuf::from("/home/u/.app2")),
        });

        let snapshot = store.snapshot();
        assert_eq!(
            snapshot.resources_path,
            Some(PathBuf::from("/opt/app/resources"))
        );
        assert_eq!(snapshot.user_data_path, Some(PathBuf::from("/home/u/.app2")));
    }

    #[test]
    fn logging_switch_is_recorded() {
        let store = DeferredSettings::new();
        store.apply_logging(LogSettings { enabled: true });
        assert!(store.snapshot().log_enabled);
        store.apply_logging(LogSettings { enabled: false });
        assert!(!store.snapshot().log_enabled);
    }
}
