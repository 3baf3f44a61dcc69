//! Event log entries and the executor state snapshot.
//!
//! `event-log.jsonl` is the append-only trail the TimeoutMonitor correlates.
//! `executor-state.json` is a materialized view the monitor overwrites
//! wholesale on every run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known `type` values in the event log.
pub mod kinds {
    pub const REQUEST: &str = "REQUEST";
    pub const ACK: &str = "ACK";
    pub const RESULT: &str = "RESULT";
    pub const TIMEOUT_DETECTED: &str = "timeout-detected";
}

/// One line of `event-log.jsonl`.
///
/// Anything beyond `type`, `taskId` and `timestamp` is kept verbatim in
/// `fields`, so entries written by other tools round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "taskId", default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EventLogEntry {
    pub fn new(kind: impl Into<String>, task_id: Option<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: kind.into(),
            task_id,
            timestamp,
            fields: Map::new(),
        }
    }

    /// Attach a freeform field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Overall health reported by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutorStatus {
    Ok,
    Timeout,
}

impl ExecutorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Timeout => "TIMEOUT",
        }
    }
}

/// Which protocol deadline a task missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// REQUEST seen, no ACK within the ack deadline.
    TimeoutAck,
    /// ACK seen, no RESULT within the result deadline.
    TimeoutResult,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeoutAck => "TIMEOUT_ACK",
            Self::TimeoutResult => "TIMEOUT_RESULT",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::TimeoutAck => Severity::Warning,
            Self::TimeoutResult => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// One breached protocol deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "taskId")]
    pub task_id: String,
    pub kind: AlertKind,
    pub severity: Severity,
    /// The timestamp the deadline is measured from.
    pub since: DateTime<Utc>,
    #[serde(rename = "elapsedSecs")]
    pub elapsed_secs: i64,
    pub message: String,
}

/// The singleton `executor-state.json` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorState {
    pub status: ExecutorStatus,
    pub message: String,
    pub alerts: Vec<Alert>,
    #[serde(rename = "lastUpdate")]
    pub last_update: DateTime<Utc>,
}

impl ExecutorState {
    pub fn ok(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: ExecutorStatus::Ok,
            message: message.into(),
            alerts: Vec::new(),
            last_update: at,
        }
    }
}
