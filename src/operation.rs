//! Units of work: external commands and custom routines.
//!
//! An [`Operation`] is immutable once constructed. Commands are argument
//! vectors, never shell strings, so there is no quoting or injection
//! ambiguity. Routines are async units of custom work (filesystem sweeps,
//! composite command sequences) that stay cooperatively cancellable by
//! polling the injected [`AbortProbe`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::control::AbortProbe;
use crate::event_bus::LogEmitter;
use crate::plan::Outcome;
use crate::process::ProcessController;

/// A unit of work within a step.
#[derive(Clone)]
pub enum Operation {
    /// Spawn an external process from an argument vector.
    Command(Vec<String>),
    /// Run a custom routine in the worker context.
    Routine(Arc<dyn Routine>),
}

impl Operation {
    pub fn command<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Operation::Command(argv.into_iter().map(Into::into).collect())
    }

    pub fn routine(routine: impl Routine + 'static) -> Self {
        Operation::Routine(Arc::new(routine))
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Command(argv) => f.debug_tuple("Command").field(argv).finish(),
            Operation::Routine(_) => f.write_str("Routine(..)"),
        }
    }
}

/// Custom unit of work executed directly in the worker context.
///
/// Implementations must poll `ctx.should_abort()` at every natural
/// checkpoint and return early with the pending interruption outcome; that
/// is the mechanism by which non-process work remains cancellable.
///
/// Failures belong in the returned [`Outcome`] plus log lines — never in a
/// panic. Per-item errors (a locked file that cannot be deleted) should be
/// logged as warnings and must not fail the step.
#[async_trait]
pub trait Routine: Send + Sync {
    async fn run(&self, ctx: RoutineContext) -> Outcome;
}

/// Execution environment handed to a [`Routine`].
///
/// Carries the abort probe, the log emitter, and a handle to the process
/// controller so composite routines can run sub-commands (e.g. stopping a
/// service, sweeping its cache, restarting it) under the same cancel/skip
/// regime as any other command.
#[derive(Clone)]
pub struct RoutineContext {
    pub abort: AbortProbe,
    pub emitter: LogEmitter,
    processes: Arc<ProcessController>,
}

impl RoutineContext {
    pub(crate) fn new(
        abort: AbortProbe,
        emitter: LogEmitter,
        processes: Arc<ProcessController>,
    ) -> Self {
        Self {
            abort,
            emitter,
            processes,
        }
    }

    /// Convenience shorthand for `self.abort.should_abort()`.
    pub fn should_abort(&self) -> bool {
        self.abort.should_abort()
    }

    /// Run a sub-command through the process controller.
    ///
    /// The sub-command shares the step's cancel/skip scope: a skip requested
    /// at any point skips the remainder of the whole step.
    pub async fn run_command<I, S>(&self, argv: I) -> Outcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        self.processes.run(&argv).await
    }
}
