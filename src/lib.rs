//! # Mendrun: sequential maintenance-run orchestration
//!
//! Mendrun drives an ordered plan of heterogeneous maintenance steps —
//! external commands and custom filesystem routines — one at a time, with
//! live log streaming, per-step skip, whole-run cancellation, and
//! deterministic progress reporting.
//!
//! ## Core concepts
//!
//! - **Operations**: a step is either a `Command` (argument vector spawned
//!   as a child process) or a `Routine` (async custom work such as a
//!   directory sweep).
//! - **Event bus**: every output line flows through a non-blocking channel
//!   to pluggable sinks; producers never wait on consumers.
//! - **Control flags**: cancel is run-scoped, skip is step-scoped; both are
//!   observed promptly even while a child process is silent.
//! - **Catalog**: the built-in operation table, filtered and ordered by
//!   user [`Selections`](catalog::Selections).
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mendrun::catalog::{build_plan, Selections};
//! use mendrun::config::RunConfig;
//! use mendrun::event_bus::EventBus;
//! use mendrun::orchestrator::{Orchestrator, ProgressObserver};
//! use mendrun::plan::RunStatus;
//!
//! struct PrintProgress;
//!
//! impl ProgressObserver for PrintProgress {
//!     fn report(&self, step_index: usize, total_steps: usize, step_name: &str) {
//!         println!("Step {step_index}/{total_steps}: {step_name}");
//!     }
//!     fn report_terminal(&self, status: RunStatus, message: &str) {
//!         println!("{status}: {message}");
//!     }
//! }
//!
//! # async fn demo() -> miette::Result<()> {
//! let bus = EventBus::default();
//! bus.listen_for_events();
//!
//! let plan = build_plan(&Selections::default());
//! let orchestrator = Orchestrator::new(RunConfig::default(), &bus, Arc::new(PrintProgress));
//! let status = orchestrator.run(&plan).await?;
//! println!("run ended as {status}");
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod control;
pub mod event_bus;
pub mod operation;
pub mod orchestrator;
pub mod plan;
pub mod process;
pub mod routines;
pub mod runner;
pub mod telemetry;

pub use config::RunConfig;
pub use control::{AbortProbe, ControlFlags};
pub use operation::{Operation, Routine, RoutineContext};
pub use orchestrator::{CompletionSignal, Orchestrator, OrchestratorError, ProgressObserver};
pub use plan::{Outcome, RunPlan, RunStatus, Step};
