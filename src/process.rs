//! Child process execution with live output streaming.
//!
//! [`ProcessController`] runs one external command at a time, forwarding
//! every stdout and stderr line to the event bus as it arrives. Cancel and
//! skip flags are re-checked on a bounded cadence even when the child is
//! silent, so a termination request never waits on output.

use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::control::ControlFlags;
use crate::event_bus::LogEmitter;
use crate::plan::Outcome;

#[derive(Debug, Error, Diagnostic)]
pub enum ProcessError {
    #[error("empty argv: nothing to run")]
    #[diagnostic(
        code(mendrun::process::empty_argv),
        help("command steps need at least a program name")
    )]
    EmptyArgv,

    #[error("failed to spawn `{program}`")]
    #[diagnostic(
        code(mendrun::process::spawn),
        help("check that the program exists and is on PATH")
    )]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs external commands one at a time and streams their output.
///
/// The active child handle is kept in a slot so that a cancel or skip
/// request can terminate it from another task.
pub struct ProcessController {
    flags: ControlFlags,
    emitter: LogEmitter,
    active: Mutex<Option<Child>>,
    kill_timeout: Duration,
    poll_interval: Duration,
}

impl ProcessController {
    pub(crate) fn new(
        flags: ControlFlags,
        emitter: LogEmitter,
        kill_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            flags,
            emitter,
            active: Mutex::new(None),
            kill_timeout,
            poll_interval,
        }
    }

    /// Runs `argv` to completion, an interruption, or a spawn failure.
    ///
    /// Emits a `=== RUN: ... ===` banner, every output line, and a terminal
    /// marker (`=== DONE ===`, `=== STOPPED (cancel) ===`, or
    /// `=== SKIPPED ===`). A non-zero exit status is reported as a warning
    /// line but still yields [`Outcome::Ok`]; a failure to spawn yields
    /// [`Outcome::Error`].
    #[instrument(skip(self), fields(program = argv.first().map(String::as_str)))]
    pub async fn run(&self, argv: &[String]) -> Outcome {
        if let Some(outcome) = self.flags.interruption() {
            return outcome;
        }
        let Some(program) = argv.first() else {
            self.emitter
                .append(format!("[ERROR] {}", ProcessError::EmptyArgv));
            return Outcome::Error(ProcessError::EmptyArgv.to_string());
        };

        self.emitter
            .append(format!("=== RUN: {} ===", argv.join(" ")));

        let mut command = Command::new(program);
        command
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                let err = ProcessError::Spawn {
                    program: program.clone(),
                    source,
                };
                self.emitter.append(format!("[ERROR] {err}"));
                return Outcome::Error(err.to_string());
            }
        };

        let (line_tx, line_rx) = flume::unbounded::<String>();
        if let Some(stdout) = child.stdout.take() {
            spawn_line_reader(stdout, line_tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_reader(stderr, line_tx);
        } else {
            // The loop below ends on channel disconnect; a sender kept alive
            // here would never let that happen.
            drop(line_tx);
        }

        *self.active.lock().expect("active slot poisoned") = Some(child);

        let mut interrupted = None;
        loop {
            if interrupted.is_none() {
                if let Some(outcome) = self.flags.interruption() {
                    interrupted = Some(outcome);
                    self.terminate_active();
                }
            }
            match timeout(self.poll_interval, line_rx.recv_async()).await {
                Ok(Ok(line)) => {
                    if interrupted.is_none() {
                        self.emitter.append(line);
                    }
                }
                // Both readers hung up: the child has closed its pipes.
                Ok(Err(_)) => break,
                // Silence; loop back around to re-check the flags.
                Err(_) => {}
            }
        }

        let child = self
            .active
            .lock()
            .expect("active slot poisoned")
            .take();
        if let Some(mut child) = child {
            match timeout(self.kill_timeout, child.wait()).await {
                Ok(Ok(status)) => {
                    if interrupted.is_none() && !status.success() {
                        self.emitter
                            .append(format!("[WARN] command exited with status {status}"));
                    }
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "failed to reap child");
                }
                Err(_) => {
                    self.emitter
                        .append("[WARN] process unresponsive; killed after timeout");
                    if let Err(err) = child.kill().await {
                        warn!(error = %err, "failed to kill unresponsive child");
                    }
                }
            }
        }

        match interrupted {
            Some(Outcome::Cancel) => {
                self.emitter.append("=== STOPPED (cancel) ===");
                Outcome::Cancel
            }
            Some(outcome) => {
                self.emitter.append("=== SKIPPED ===");
                outcome
            }
            None => {
                self.emitter.append("=== DONE ===");
                Outcome::Ok
            }
        }
    }

    /// Asks the currently running child, if any, to stop.
    ///
    /// Called from cancel/skip request paths; the run loop notices the flag
    /// and handles reaping.
    pub fn request_termination(&self, reason: &str) {
        let mut slot = self.active.lock().expect("active slot poisoned");
        if let Some(child) = slot.as_mut() {
            self.emitter
                .append(format!("[INFO] {reason}. Terminating current command..."));
            if let Err(err) = child.start_kill() {
                debug!(error = %err, "start_kill on already-finished child");
            }
        }
    }

    fn terminate_active(&self) {
        let mut slot = self.active.lock().expect("active slot poisoned");
        if let Some(child) = slot.as_mut() {
            if let Err(err) = child.start_kill() {
                debug!(error = %err, "start_kill on already-finished child");
            }
        }
    }

    /// Drops any child still held in the slot. Used when a step paniced and
    /// the normal reaping path did not run; `kill_on_drop` cleans up.
    pub(crate) fn clear_active(&self) {
        self.active.lock().expect("active slot poisoned").take();
    }
}

fn spawn_line_reader<R>(reader: R, tx: flume::Sender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
}
