use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mendrun::control::ControlFlags;
use mendrun::operation::{Routine, RoutineContext};
use mendrun::plan::Outcome;

/// Returns a fixed outcome, optionally recording that it ran.
pub struct StaticRoutine {
    outcome: Outcome,
    ran: Option<Arc<AtomicBool>>,
}

impl StaticRoutine {
    pub fn ok() -> Self {
        Self {
            outcome: Outcome::Ok,
            ran: None,
        }
    }

    pub fn recording(ran: Arc<AtomicBool>) -> Self {
        Self {
            outcome: Outcome::Ok,
            ran: Some(ran),
        }
    }
}

#[async_trait]
impl Routine for StaticRoutine {
    async fn run(&self, _ctx: RoutineContext) -> Outcome {
        if let Some(ran) = &self.ran {
            ran.store(true, Ordering::SeqCst);
        }
        self.outcome.clone()
    }
}

/// Sets the run-wide cancel flag mid-execution, then returns `outcome`.
///
/// Returning `Ok` models a step that finishes normally while cancellation is
/// already pending; returning `Cancel` models a step interrupted in flight.
pub struct CancelInside {
    pub flags: ControlFlags,
    pub outcome: Outcome,
}

#[async_trait]
impl Routine for CancelInside {
    async fn run(&self, _ctx: RoutineContext) -> Outcome {
        self.flags.request_cancel();
        self.outcome.clone()
    }
}

/// Raises a skip request against itself and returns the pending interruption.
pub struct SkipInside {
    pub flags: ControlFlags,
}

#[async_trait]
impl Routine for SkipInside {
    async fn run(&self, ctx: RoutineContext) -> Outcome {
        self.flags.request_skip();
        ctx.abort.interruption().unwrap_or(Outcome::Ok)
    }
}

/// Records whether an abort was already pending when the step started.
pub struct AbortCheckRoutine {
    pub saw_abort: Arc<AtomicBool>,
}

#[async_trait]
impl Routine for AbortCheckRoutine {
    async fn run(&self, ctx: RoutineContext) -> Outcome {
        self.saw_abort.store(ctx.should_abort(), Ordering::SeqCst);
        Outcome::Ok
    }
}

/// Panics, for exercising the worker fault boundary.
pub struct PanicRoutine;

#[async_trait]
impl Routine for PanicRoutine {
    async fn run(&self, _ctx: RoutineContext) -> Outcome {
        panic!("routine blew up");
    }
}
