//! Load-once cache for the capability implementation module.
//!
//! Loading the implementation (typically a native library) is the expensive
//! part of bringing the capability up. The cache is shared by the lazy
//! instance and the health check, so whichever runs first pays the cost and
//! the other reuses the loaded module. The cache is independent of the
//! instance slot: a health check may load the module without an operational
//! instance ever existing.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::capability::{CapabilityError, CapabilityModule, ModuleLoader};

const MODULE_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::module");

/// Memoised module loader.
pub struct ModuleCache {
    loader: Box<dyn ModuleLoader>,
    module: OnceCell<Arc<dyn CapabilityModule>>,
}

impl ModuleCache {
    /// Wraps a loader. Nothing is loaded until first demand.
    #[must_use]
    pub fn new(loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            module: OnceCell::new(),
        }
    }

    /// Returns the loaded module, loading it on first use.
    ///
    /// Concurrent first calls block on a single load. A failed load is not
    /// cached; the next call asks the loader again.
    ///
    /// # Errors
    ///
    /// Propagates the loader's error.
    pub fn get_or_load(&self) -> Result<Arc<dyn CapabilityModule>, CapabilityError> {
        self.module
            .get_or_try_init(|| {
                debug!(target: MODULE_TARGET, "loading capability module");
                self.loader.load()
            })
            .map(Arc::clone)
    }

    /// Returns `true` once a load has succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.module.get().is_some()
    }
}

impl fmt::Debug for ModuleCache {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ModuleCache")
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
