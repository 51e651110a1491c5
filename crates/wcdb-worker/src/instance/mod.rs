//! Lazily constructed, shared capability instance.
//!
//! The instance is built the first time an instance-bound message needs it
//! and reused by every later message. Handlers run on parallel threads, so
//! construction is single-flight: the first caller builds while concurrent
//! callers wait on the same attempt and receive its outcome, success or
//! failure. A failed attempt leaves the slot empty so the next caller starts
//! over.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::capability::{Capability, CapabilityError};
use crate::module::ModuleCache;
use crate::reporter::WorkerReporter;
use crate::settings::DeferredSettings;

const INSTANCE_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::instance");

type Outcome = Result<Arc<dyn Capability>, CapabilityError>;

/// One construction attempt, observed by the builder and all waiters.
#[derive(Default)]
struct Flight {
    outcome: OnceCell<Outcome>,
}

enum Slot {
    Empty,
    Pending(Arc<Flight>),
    Ready(Arc<dyn Capability>),
}

enum Role {
    Builder(Arc<Flight>),
    Waiter(Arc<Flight>),
}

/// Single-flight holder of the operational capability instance.
pub struct LazyInstance {
    modules: Arc<ModuleCache>,
    settings: Arc<DeferredSettings>,
    reporter: Arc<dyn WorkerReporter>,
    slot: Mutex<Slot>,
}

impl LazyInstance {
    /// Creates an empty holder. Nothing is constructed until first demand.
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
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// Returns the shared instance, constructing it on first use.
    ///
    /// # Errors
    ///
    /// Returns the module load or construction error of the attempt this call
    /// built or waited on. The failure is not cached.
    pub fn get_or_create(&self) -> Result<Arc<dyn Capability>, CapabilityError> {
        let role = {
            let mut slot = self.lock_slot();
            match &*slot {
                Slot::Ready(instance) => return Ok(Arc::clone(instance)),
                Slot::Pending(flight) => Role::Waiter(Arc::clone(flight)),
                Slot::Empty => {
                    let flight = Arc::new(Flight::default());
                    *slot = Slot::Pending(Arc::clone(&flight));
                    Role::Builder(flight)
                }
            }
        };

        match role {
            Role::Waiter(flight) => {
                debug!(target: INSTANCE_TARGET, "waiting on in-flight construction");
                flight.outcome.wait().clone()
            }
            Role::Builder(flight) => {
                let mut guard = FlightGuard {
                    owner: self,
                    flight,
                    settled: false,
                };
                let outcome = self.construct();
                guard.settle(outcome.clone());
                outcome
            }
        }
    }

    /// Returns the instance if one has been constructed, without building.
    #[must_use]
    pub fn current(&self) -> Option<Arc<dyn Capability>> {
        match &*self.lock_slot() {
            Slot::Ready(instance) => Some(Arc::clone(instance)),
            Slot::Empty | Slot::Pending(_) => None,
        }
    }

    /// Shuts down and forgets the current instance.
    ///
    /// Waits for an in-flight construction to settle first so a freshly
    /// built instance is not leaked. Returns `true` when an instance was
    /// shut down.
    pub fn teardown(&self) -> bool {
        loop {
            let pending = {
                let mut slot = self.lock_slot();
                match std::mem::replace(&mut *slot, Slot::Empty) {
                    Slot::Empty => return false,
                    Slot::Ready(instance) => {
                        drop(slot);
                        instance.shutdown();
                        self.reporter.instance_torn_down();
                        return true;
                    }
                    Slot::Pending(flight) => {
                        *slot = Slot::Pending(Arc::clone(&flight));
                        flight
                    }
                }
            };
            let _settled = pending.outcome.wait();
        }
    }

    fn construct(&self) -> Outcome {
        self.reporter.instance_constructing();
        let outcome = self.modules.get_or_load().and_then(|module| {
            let settings = self.settings.snapshot();
            module.construct(&settings)
        });
        match &outcome {
            Ok(_) => self.reporter.instance_ready(),
            Err(error) => self.reporter.instance_failed(error),
        }
        outcome
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for LazyInstance {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.lock_slot() {
            Slot::Empty => "empty",
            Slot::Pending(_) => "pending",
            Slot::Ready(_) => "ready",
        };
        formatter
            .debug_struct("LazyInstance")
            .field("state", &state)
            .field("modules", &self.modules)
            .finish_non_exhaustive()
    }
}

/// Publishes the builder's outcome, including when construction unwinds.
struct FlightGuard<'a> {
    owner: &'a LazyInstance,
    flight: Arc<Flight>,
    settled: bool,
}

impl FlightGuard<'_> {
    fn settle(&mut self, outcome: Outcome) {
        {
            let mut slot = self.owner.lock_slot();
            if matches!(&*slot, Slot::Pending(current) if Arc::ptr_eq(current, &self.flight)) {
                *slot = match &outcome {
                    Ok(instance) => Slot::Ready(Arc::clone(instance)),
                    Err(_) => Slot::Empty,
                };
            }
        }
        let _first = self.flight.outcome.set(outcome);
        self.settled = true;
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(Err(CapabilityError::ConstructionAborted));
        }
    }
}
