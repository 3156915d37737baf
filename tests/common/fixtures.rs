use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mendrun::config::RunConfig;
use mendrun::event_bus::{EventBus, MemorySink};
use mendrun::orchestrator::{CompletionSignal, Orchestrator, ProgressObserver};
use mendrun::plan::RunStatus;

/// Records every progress and terminal report for later assertions.
#[derive(Default)]
pub struct CollectingObserver {
    reports: Mutex<Vec<(usize, usize, String)>>,
    terminals: Mutex<Vec<(RunStatus, String)>>,
}

impl CollectingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reports(&self) -> Vec<(usize, usize, String)> {
        self.reports.lock().unwrap().clone()
    }

    pub fn terminals(&self) -> Vec<(RunStatus, String)> {
        self.terminals.lock().unwrap().clone()
    }
}

impl ProgressObserver for CollectingObserver {
    fn report(&self, step_index: usize, total_steps: usize, step_name: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((step_index, total_steps, step_name.to_string()));
    }

    fn report_terminal(&self, status: RunStatus, message: &str) {
        self.terminals
            .lock()
            .unwrap()
            .push((status, message.to_string()));
    }
}

/// Counts completion notifications.
#[derive(Default)]
pub struct CountingSignal {
    count: AtomicUsize,
}

impl CountingSignal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl CompletionSignal for CountingSignal {
    fn notify(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A fully wired orchestrator with a memory sink and recording observer.
pub struct Harness {
    pub bus: EventBus,
    pub sink: MemorySink,
    pub observer: Arc<CollectingObserver>,
    pub signal: Arc<CountingSignal>,
    pub orchestrator: Arc<Orchestrator>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(
            RunConfig::default()
                .with_kill_timeout(Duration::from_secs(2))
                .with_poll_interval(Duration::from_millis(20)),
        )
    }

    pub fn with_config(config: RunConfig) -> Self {
        let sink = MemorySink::new();
        let bus = EventBus::with_sink(sink.clone());
        bus.listen_for_events();

        let observer = CollectingObserver::new();
        let signal = CountingSignal::new();
        let orchestrator = Arc::new(
            Orchestrator::new(config, &bus, observer.clone())
                .with_completion_signal(signal.clone()),
        );
        Self {
            bus,
            sink,
            observer,
            signal,
            orchestrator,
        }
    }

    /// Drain the listener so every emitted line is visible in the sink.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.bus.stop_listener().await;
    }
}
