//! Dispatch of a single step to its execution strategy.

use std::sync::Arc;

use tracing::instrument;

use crate::control::{AbortProbe, ControlFlags};
use crate::event_bus::LogEmitter;
use crate::operation::{Operation, RoutineContext};
use crate::plan::{Outcome, Step};
use crate::process::ProcessController;

/// Executes one step at a time via the shared process controller.
pub struct StepRunner {
    flags: ControlFlags,
    emitter: LogEmitter,
    processes: Arc<ProcessController>,
}

impl StepRunner {
    pub(crate) fn new(
        flags: ControlFlags,
        emitter: LogEmitter,
        processes: Arc<ProcessController>,
    ) -> Self {
        Self {
            flags,
            emitter,
            processes,
        }
    }

    /// Runs `step`, consuming any skip request left over from before it
    /// started. A skip raised during the step interrupts it; a skip raised
    /// before it would otherwise cancel the wrong step.
    #[instrument(skip(self, step), fields(step = %step.name))]
    pub async fn run_step(&self, step: &Step) -> Outcome {
        self.flags.clear_skip();
        if self.flags.cancel_requested() {
            return Outcome::Cancel;
        }
        match &step.operation {
            Operation::Command(argv) => self.processes.run(argv).await,
            Operation::Routine(routine) => {
                let ctx = RoutineContext::new(
                    AbortProbe::new(self.flags.clone()),
                    self.emitter.clone(),
                    Arc::clone(&self.processes),
                );
                routine.run(ctx).await
            }
        }
    }
}
