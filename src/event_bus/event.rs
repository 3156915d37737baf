use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A single entry flowing through the log stream.
///
/// The core pushes two kinds of entries: step-scoped output (command output
/// lines, run markers, per-item warnings) and core diagnostics (run banners,
/// housekeeping notes). Consumers that only want the raw text can use
/// [`LogEvent::message`]; the `Display` impl renders the human-readable line
/// the presentation layer appends to its log view.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogEvent {
    Output(OutputEvent),
    Diagnostic(DiagnosticEvent),
}

impl LogEvent {
    /// An output line with no step metadata attached.
    pub fn output(message: impl Into<String>) -> Self {
        LogEvent::Output(OutputEvent::new(None, None, message.into()))
    }

    /// An output line attributed to a step by index and name.
    pub fn step_output(
        step_index: usize,
        step_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LogEvent::Output(OutputEvent::new(
            Some(step_index),
            Some(step_name.into()),
            message.into(),
        ))
    }

    pub fn diagnostic(scope: impl Into<String>, message: impl Into<String>) -> Self {
        LogEvent::Diagnostic(DiagnosticEvent {
            scope: scope.into(),
            message: message.into(),
            when: Utc::now(),
        })
    }

    pub fn scope_label(&self) -> Option<&str> {
        match self {
            LogEvent::Output(_) => None,
            LogEvent::Diagnostic(diag) => Some(diag.scope()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LogEvent::Output(out) => out.message(),
            LogEvent::Diagnostic(diag) => diag.message(),
        }
    }

    /// Structured JSON projection for sinks that feed dashboards or files.
    pub fn to_json_value(&self) -> Value {
        let (event_type, metadata) = match self {
            LogEvent::Output(out) => {
                let mut meta = serde_json::Map::new();
                if let Some(index) = out.step_index() {
                    meta.insert("step_index".to_string(), json!(index));
                }
                if let Some(name) = out.step_name() {
                    meta.insert("step_name".to_string(), json!(name));
                }
                ("output", Value::Object(meta))
            }
            LogEvent::Diagnostic(diag) => {
                let mut meta = serde_json::Map::new();
                meta.insert("scope".to_string(), json!(diag.scope()));
                ("diagnostic", Value::Object(meta))
            }
        };

        json!({
            "type": event_type,
            "message": self.message(),
            "timestamp": self.timestamp().to_rfc3339(),
            "metadata": metadata,
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LogEvent::Output(out) => out.when,
            LogEvent::Diagnostic(diag) => diag.when(),
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEvent::Output(out) => match (out.step_index(), out.step_name()) {
                (Some(index), Some(name)) => write!(f, "[{index} {name}] {}", out.message()),
                (Some(index), None) => write!(f, "[step {index}] {}", out.message()),
                _ => write!(f, "{}", out.message()),
            },
            LogEvent::Diagnostic(diag) => write!(f, "[{}] {}", diag.scope(), diag.message()),
        }
    }
}

/// One line of step output (command output, run marker, or per-item warning).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputEvent {
    step_index: Option<usize>,
    step_name: Option<String>,
    message: String,
    #[serde(default = "Utc::now")]
    when: DateTime<Utc>,
}

impl OutputEvent {
    pub fn new(step_index: Option<usize>, step_name: Option<String>, message: String) -> Self {
        Self {
            step_index,
            step_name,
            message,
            when: Utc::now(),
        }
    }

    pub fn step_index(&self) -> Option<usize> {
        self.step_index
    }

    pub fn step_name(&self) -> Option<&str> {
        self.step_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Core housekeeping message (run banners, termination notes).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticEvent {
    scope: String,
    message: String,
    #[serde(default = "Utc::now")]
    when: DateTime<Utc>,
}

impl DiagnosticEvent {
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn when(&self) -> DateTime<Utc> {
        self.when
    }
}
