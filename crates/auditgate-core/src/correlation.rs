//! REQUEST/ACK/RESULT correlation over the event log.
//!
//! Each `taskId` moves through `NoRequest → Requested → Acked → Resulted`.
//! ACK and RESULT only ever advance the phase. A REQUEST opens a fresh cycle
//! for its task, replacing whatever the previous cycle reached, so a re-run
//! of the same PR is tracked on its own clock.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use auditgate_contracts::event::{kinds, EventLogEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPhase {
    NoRequest,
    Requested,
    Acked,
    Resulted,
}

impl TaskPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRequest => "NO_REQUEST",
            Self::Requested => "REQUESTED",
            Self::Acked => "ACKED",
            Self::Resulted => "RESULTED",
        }
    }
}

/// The latest protocol cycle observed for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTrack {
    pub task_id: String,
    pub phase: TaskPhase,
    pub requested_at: Option<DateTime<Utc>>,
    pub acked_at: Option<DateTime<Utc>>,
    pub resulted_at: Option<DateTime<Utc>>,
}

impl TaskTrack {
    fn new(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            phase: TaskPhase::NoRequest,
            requested_at: None,
            acked_at: None,
            resulted_at: None,
        }
    }

    fn observe(&mut self, kind: &str, at: DateTime<Utc>) {
        match kind {
            kinds::REQUEST => {
                *self = Self::new(&self.task_id);
                self.phase = TaskPhase::Requested;
                self.requested_at = Some(at);
            }
            kinds::ACK => {
                self.acked_at.get_or_insert(at);
                self.phase = self.phase.max(TaskPhase::Acked);
            }
            kinds::RESULT => {
                self.resulted_at.get_or_insert(at);
                self.phase = TaskPhase::Resulted;
            }
            _ => {}
        }
    }

    /// The instant protocol deadlines are measured from: the REQUEST, or the
    /// ACK when no REQUEST was logged.
    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        self.requested_at.or(self.acked_at)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.phase, TaskPhase::Requested | TaskPhase::Acked)
    }
}

/// Fold the log into one track per task, ordered by first appearance.
///
/// Entries without a `taskId`, and types other than REQUEST/ACK/RESULT, are
/// ignored.
pub fn correlate(events: &[EventLogEntry]) -> Vec<TaskTrack> {
    let mut order: Vec<String> = Vec::new();
    let mut tracks: HashMap<String, TaskTrack> = HashMap::new();

    for entry in events {
        let Some(task_id) = entry.task_id.as_deref() else {
            continue;
        };
        if !matches!(entry.kind.as_str(), kinds::REQUEST | kinds::ACK | kinds::RESULT) {
            continue;
        }
        let track = tracks.entry(task_id.to_string()).or_insert_with(|| {
            order.push(task_id.to_string());
            TaskTrack::new(task_id)
        });
        track.observe(&entry.kind, entry.timestamp);
    }

    order
        .into_iter()
        .filter_map(|id| tracks.remove(&id))
        .collect()
}

/// Task ids whose latest cycle has not reached RESULT.
pub fn open_tasks(events: &[EventLogEntry]) -> Vec<String> {
    correlate(events)
        .into_iter()
        .filter(TaskTrack::is_open)
        .map(|t| t.task_id)
        .collect()
}
