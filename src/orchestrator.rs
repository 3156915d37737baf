//! Sequential run orchestration.
//!
//! The [`Orchestrator`] drives a [`RunPlan`] step by step on the worker
//! context while the observer context watches progress and raises cancel or
//! skip requests. One run at a time; the flags reset at the start of every
//! run so a cancelled run never poisons the next one.

use std::sync::Arc;

use futures_util::FutureExt;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::RunConfig;
use crate::control::ControlFlags;
use crate::event_bus::{EventBus, LogEmitter};
use crate::plan::{Outcome, RunPlan, RunStatus};
use crate::process::ProcessController;
use crate::runner::StepRunner;

/// Receives progress and terminal reports for a run.
///
/// `report` is called once per step, before the step executes, with a
/// 1-based index. `report_terminal` is called at most once per run, after
/// the last `report`.
pub trait ProgressObserver: Send + Sync {
    fn report(&self, step_index: usize, total_steps: usize, step_name: &str);
    fn report_terminal(&self, status: RunStatus, message: &str);
}

/// Fired exactly once when a run reaches [`RunStatus::Completed`].
///
/// Never fired on `Cancelled` or `Failed`.
pub trait CompletionSignal: Send + Sync {
    fn notify(&self);
}

#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    #[error("run plan is empty: nothing selected")]
    #[diagnostic(
        code(mendrun::orchestrator::empty_plan),
        help("enable at least one operation before starting a run")
    )]
    EmptyPlan,
}

/// Drives a plan to a terminal status.
pub struct Orchestrator {
    config: RunConfig,
    flags: ControlFlags,
    emitter: LogEmitter,
    processes: Arc<ProcessController>,
    observer: Arc<dyn ProgressObserver>,
    signal: Option<Arc<dyn CompletionSignal>>,
}

impl Orchestrator {
    pub fn new(
        config: RunConfig,
        bus: &EventBus,
        observer: Arc<dyn ProgressObserver>,
    ) -> Self {
        let flags = ControlFlags::new();
        let emitter = bus.emitter();
        let processes = Arc::new(ProcessController::new(
            flags.clone(),
            emitter.clone(),
            config.kill_timeout,
            config.poll_interval,
        ));
        Self {
            config,
            flags,
            emitter,
            processes,
            observer,
            signal: None,
        }
    }

    #[must_use]
    pub fn with_completion_signal(mut self, signal: Arc<dyn CompletionSignal>) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Control handle for the observer context. Clones share state with the
    /// running worker.
    pub fn flags(&self) -> ControlFlags {
        self.flags.clone()
    }

    /// Requests cancellation of the whole run and terminates the current
    /// child process, if any.
    pub fn request_cancel(&self) {
        self.flags.request_cancel();
        self.processes.request_termination("Cancel requested");
    }

    /// Requests skipping the currently running step only.
    pub fn request_skip(&self) {
        self.flags.request_skip();
        self.processes.request_termination("Skip requested");
    }

    /// Runs every step of `plan` in order and reports a terminal status.
    ///
    /// Panics inside steps or routines are contained here: the run ends as
    /// [`RunStatus::Failed`] with no dangling process handle.
    #[instrument(skip(self, plan), fields(run_id = self.config.run_id.as_deref(), steps = plan.len()))]
    pub async fn run(&self, plan: &RunPlan) -> Result<RunStatus, OrchestratorError> {
        if plan.is_empty() {
            return Err(OrchestratorError::EmptyPlan);
        }
        self.flags.reset();
        if let Some(run_id) = &self.config.run_id {
            self.emitter
                .diagnostic("orchestrator", format!("starting run {run_id}"));
        }

        let status = match std::panic::AssertUnwindSafe(self.run_inner(plan))
            .catch_unwind()
            .await
        {
            Ok(status) => status,
            Err(payload) => {
                self.processes.clear_active();
                let detail = panic_message(&payload);
                error!(detail, "worker panicked");
                self.emitter.append(format!("[ERROR] internal fault: {detail}"));
                self.observer
                    .report_terminal(RunStatus::Failed, "Internal fault");
                RunStatus::Failed
            }
        };

        if status == RunStatus::Completed {
            if let Some(signal) = &self.signal {
                signal.notify();
            }
        }
        info!(%status, "run finished");
        Ok(status)
    }

    async fn run_inner(&self, plan: &RunPlan) -> RunStatus {
        let runner = StepRunner::new(
            self.flags.clone(),
            self.emitter.clone(),
            Arc::clone(&self.processes),
        );
        let total = plan.len();

        for (index, step) in plan.steps().iter().enumerate() {
            if self.flags.cancel_requested() {
                return self.cancelled();
            }
            self.observer.report(index + 1, total, &step.name);

            match runner.run_step(step).await {
                Outcome::Ok => {}
                Outcome::Skip => {
                    self.emitter
                        .append(format!("[INFO] Step skipped: {}", step.name));
                    self.flags.clear_skip();
                }
                Outcome::Cancel => return self.cancelled(),
                // Independent maintenance steps: a failed one never blocks
                // the rest of the run. The log stream carries the detail.
                Outcome::Error(detail) => {
                    info!(step = %step.name, %detail, "step failed; continuing");
                }
            }
        }

        self.emitter.append("All selected tasks finished.");
        self.observer.report_terminal(RunStatus::Completed, "Done");
        RunStatus::Completed
    }

    fn cancelled(&self) -> RunStatus {
        self.emitter.append("[INFO] Cancelled. Stopping all steps.");
        self.observer
            .report_terminal(RunStatus::Cancelled, "Cancelled");
        RunStatus::Cancelled
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic payload"
    }
}
