//! Run plans and terminal result types.
//!
//! A [`RunPlan`] is built once per run from the current selections and stays
//! immutable for the run's lifetime. Steps have positional identity only;
//! they are not individually addressable after a run starts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::operation::Operation;

/// Terminal result of one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The step ran to its end (including "ran and the command exited
    /// non-zero" — failing repair steps do not halt the run).
    Ok,
    /// The observer abandoned this step only.
    Skip,
    /// The observer cancelled the whole run during this step.
    Cancel,
    /// The step could not execute at all (e.g. the process failed to spawn).
    Error(String),
}

impl Outcome {
    /// True for the outcomes that stop or redirect sequencing (cancel/skip).
    pub fn is_interruption(&self) -> bool {
        matches!(self, Outcome::Cancel | Outcome::Skip)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok => write!(f, "ok"),
            Outcome::Skip => write!(f, "skip"),
            Outcome::Cancel => write!(f, "cancel"),
            Outcome::Error(detail) => write!(f, "error: {detail}"),
        }
    }
}

/// Terminal status of a whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Completed,
    Cancelled,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Cancelled => write!(f, "cancelled"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One named unit of work in a run.
#[derive(Clone, Debug)]
pub struct Step {
    pub name: String,
    pub operation: Operation,
}

impl Step {
    pub fn new(name: impl Into<String>, operation: Operation) -> Self {
        Self {
            name: name.into(),
            operation,
        }
    }
}

/// The ordered sequence of steps for one run.
#[derive(Clone, Debug, Default)]
pub struct RunPlan {
    steps: Vec<Step>,
}

impl RunPlan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
