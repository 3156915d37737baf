use miette::Diagnostic;
use thiserror::Error;

use super::event::LogEvent;

/// Producer half of the log stream.
///
/// Cheap to clone; every component that emits lines (process controller,
/// step runner, routines, orchestrator) holds one. Sends never block: the
/// underlying channel is unbounded, so a slow consumer cannot stall the
/// worker context.
#[derive(Clone, Debug)]
pub struct LogEmitter {
    sender: flume::Sender<LogEvent>,
}

impl LogEmitter {
    pub(crate) fn new(sender: flume::Sender<LogEvent>) -> Self {
        Self { sender }
    }

    /// Emit a structured event, surfacing a disconnected bus to the caller.
    pub fn emit(&self, event: LogEvent) -> Result<(), EmitterError> {
        self.sender.send(event).map_err(|_| EmitterError::Disconnected)
    }

    /// Append one output line. A dropped bus loses observability only; it is
    /// never a step failure, so failures are downgraded to trace noise.
    pub fn append(&self, message: impl Into<String>) {
        if self.emit(LogEvent::output(message)).is_err() {
            tracing::debug!("log sink disconnected; dropping output line");
        }
    }

    /// Append one output line attributed to a step.
    pub fn append_for_step(
        &self,
        step_index: usize,
        step_name: impl Into<String>,
        message: impl Into<String>,
    ) {
        if self
            .emit(LogEvent::step_output(step_index, step_name, message))
            .is_err()
        {
            tracing::debug!("log sink disconnected; dropping step output line");
        }
    }

    /// Append a core diagnostic message under the given scope.
    pub fn diagnostic(&self, scope: impl Into<String>, message: impl Into<String>) {
        if self.emit(LogEvent::diagnostic(scope, message)).is_err() {
            tracing::debug!("log sink disconnected; dropping diagnostic");
        }
    }
}

/// Errors that can occur when emitting a log event.
#[derive(Debug, Error, Diagnostic)]
pub enum EmitterError {
    #[error("log sink unavailable: channel disconnected")]
    #[diagnostic(
        code(mendrun::event_bus::disconnected),
        help("The event bus listener has stopped or the bus was dropped.")
    )]
    Disconnected,
}
