//! Recording doubles for the capability collaborators.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::json;
use wcdb_config::Config;

use crate::bootstrap::BootstrapError;
use crate::capability::{
    Capability, CapabilityError, CapabilityModule, CapabilityResult, ContactRef, ModuleLoader,
    MonitorCallback, QueryArgs, SessionPage, VoiceQuery,
};
use crate::health::HealthOutcome;
use crate::reporter::WorkerReporter;
use crate::settings::WorkerSettings;

/// How a fake instance answers `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitBehaviour {
    #[default]
    Succeed,
    Report,
    Fail,
}

/// In-memory capability that records lifecycle calls.
pub struct FakeCapability {
    serial: usize,
    settings: WorkerSettings,
    init: InitBehaviour,
    shutdowns: AtomicUsize,
    monitor: Mutex<Option<MonitorCallback>>,
}

impl FakeCapability {
    fn new(serial: usize, settings: WorkerSettings, init: InitBehaviour) -> Self {
        Self {
            serial,
            settings,
            init,
            shutdowns: AtomicUsize::new(0),
            monitor: Mutex::new(None),
        }
    }

    /// Construction order, starting at 1.
    pub fn serial(&self) -> usize {
        self.serial
    }

    /// Settings handed to the module when this instance was built.
    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    /// Number of `shutdown` calls received.
    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    /// Fires the registered monitor callback, returning whether one existed.
    pub fn emit(&self, event_type: &str, json: &str) -> bool {
        let callback = self.monitor.lock().expect("monitor mutex").clone();
        match callback {
            Some(callback) => {
                callback(event_type, json);
                true
            }
            None => false,
        }
    }
}

impl Capability for FakeCapability {
    fn initialize(&self) -> Result<bool, CapabilityError> {
        match self.init {
            InitBehaviour::Succeed => Ok(true),
            InitBehaviour::Report => Ok(false),
            InitBehaviour::Fail => Err(CapabilityError::operation(
                "initialize",
                "access violation in native init",
            )),
        }
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }

    fn set_monitor(&self, callback: MonitorCallback) {
        *self.monitor.lock().expect("monitor mutex") = Some(callback);
    }

    fn close(&self) -> CapabilityResult {
        Ok(json!(false))
    }

    fn is_connected(&self) -> CapabilityResult {
        Ok(json!(true))
    }

    fn get_sessions(&self) -> CapabilityResult {
        Ok(json!({"success": true, "sessions": [], "instance": self.serial}))
    }

    fn get_messages(&self, args: &SessionPage) -> CapabilityResult {
        Ok(json!({
            "success": true,
            "sessionId": args.session_id,
            "limit": args.limit,
            "offset": args.offset,
        }))
    }

    fn get_contact(&self, args: &ContactRef) -> CapabilityResult {
        panic!("contact table corrupted for {}", args.username);
    }

    fn exec_query(&self, _args: &QueryArgs) -> CapabilityResult {
        Err(CapabilityError::operation("execQuery", "database is locked"))
    }

    fn get_voice_data(&self, _args: &VoiceQuery) -> CapabilityResult {
        Ok(json!({"success": false, "error": "voice clip not found"}))
    }
}

/// Module double that builds [`FakeCapability`] instances.
#[derive(Default)]
pub struct FakeModule {
    constructions: AtomicUsize,
    failures_remaining: AtomicUsize,
    panic_next: AtomicBool,
    delay: Mutex<Duration>,
    init: Mutex<InitBehaviour>,
    last_error: Mutex<Option<String>>,
    built: Mutex<Vec<Arc<FakeCapability>>>,
}

impl FakeModule {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the next `count` constructions fail.
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Makes the next construction panic.
    pub fn panic_next(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }

    /// Slows every construction down by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().expect("delay mutex") = delay;
    }

    /// Chooses how instances built from now on answer `initialize`.
    pub fn set_init(&self, init: InitBehaviour) {
        *self.init.lock().expect("init mutex") = init;
    }

    /// Sets the value returned by `last_init_error`.
    pub fn set_last_error(&self, error: Option<&str>) {
        *self.last_error.lock().expect("last error mutex") = error.map(str::to_owned);
    }

    /// Number of construction attempts, failed ones included.
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    /// Instances built so far, in construction order.
    pub fn built(&self) -> Vec<Arc<FakeCapability>> {
        self.built.lock().expect("built mutex").clone()
    }
}

impl CapabilityModule for FakeModule {
    fn construct(&self, settings: &WorkerSettings) -> Result<Arc<dyn Capability>, CapabilityError> {
        let attempt = self.constructions.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = *self.delay.lock().expect("delay mutex");
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("native constructor crashed");
        }
        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CapabilityError::construct(format!(
                "attempt {attempt}: wcdb.dll could not be mapped"
            )));
        }

        let init = *self.init.lock().expect("init mutex");
        let mut built = self.built.lock().expect("built mutex");
        let instance = Arc::new(FakeCapability::new(built.len() + 1, settings.clone(), init));
        built.push(Arc::clone(&instance));
        Ok(instance)
    }

    fn last_init_error(&self) -> Option<String> {
        self.last_error.lock().expect("last error mutex").clone()
    }
}

/// Loader double handing out a shared [`FakeModule`].
pub struct FakeLoader {
    module: Arc<FakeModule>,
    loads: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeLoader {
    pub fn new(module: &Arc<FakeModule>) -> Self {
        Self {
            module: Arc::clone(module),
            loads: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    /// Loader whose every load fails.
    pub fn failing(module: &Arc<FakeModule>) -> Self {
        Self {
            fail: true,
            ..Self::new(module)
        }
    }

    /// Shared counter of load calls.
    pub fn loads(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }
}

impl ModuleLoader for FakeLoader {
    fn load(&self) -> Result<Arc<dyn CapabilityModule>, CapabilityError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CapabilityError::load("wcdb.dll: module not found"));
        }
        Ok(Arc::clone(&self.module) as Arc<dyn CapabilityModule>)
    }
}

/// Lifecycle events captured by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed,
    InstanceConstructing,
    InstanceReady,
    InstanceFailed(String),
    InstanceTornDown,
    HealthChecked { healthy: bool },
}

/// Reporter that stores every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().expect("events mutex").clone()
    }

    fn record(&self, event: LifecycleEvent) {
        self.events.lock().expect("events mutex").push(event);
    }
}

impl WorkerReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.record(LifecycleEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(LifecycleEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, _error: &BootstrapError) {
        self.record(LifecycleEvent::BootstrapFailed);
    }

    fn instance_constructing(&self) {
        self.record(LifecycleEvent::InstanceConstructing);
    }

    fn instance_ready(&self) {
        self.record(LifecycleEvent::InstanceReady);
    }

    fn instance_failed(&self, error: &CapabilityError) {
        self.record(LifecycleEvent::InstanceFailed(error.to_string()));
    }

    fn instance_torn_down(&self) {
        self.record(LifecycleEvent::InstanceTornDown);
    }

    fn health_checked(&self, outcome: &HealthOutcome) {
        self.record(LifecycleEvent::HealthChecked {
            healthy: outcome.is_healthy(),
        });
    }
}
