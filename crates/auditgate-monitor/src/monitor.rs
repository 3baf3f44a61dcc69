//! The timeout monitor.
//!
//! Runs independently of the protocol client: it reads only the event log,
//! so it can detect a client that crashed or hung between phases. Each run
//! re-evaluates every task from scratch; an alert that is still true is
//! reported again.
//!
//! Deadlines (strictly greater than):
//!
//! - `REQUESTED` longer than `ack_timeout_secs` → `TIMEOUT_ACK` (WARNING)
//! - `ACKED` longer than `result_timeout_secs` after the REQUEST, or after
//!   the ACK when no REQUEST was logged → `TIMEOUT_RESULT` (ERROR)

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use auditgate_contracts::{
    config::MonitorSettings,
    digest::canonical_json,
    error::{GateError, GateResult},
    event::{kinds, Alert, AlertKind, EventLogEntry, ExecutorState, ExecutorStatus},
    layout::{EXECUTOR_STATE, PROCESS_ALERT},
};
use auditgate_core::{
    correlation::{correlate, TaskPhase, TaskTrack},
    traits::EventStore,
};

use crate::alert;

/// What one monitor run found and wrote.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    pub tracks: Vec<TaskTrack>,
    pub alerts: Vec<Alert>,
    pub state: ExecutorState,
}

/// Read-only view for `events-monitor status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    /// `None` until the monitor has run once.
    pub state: Option<ExecutorState>,
    pub tracks: Vec<TaskTrack>,
}

pub struct TimeoutMonitor<'a> {
    store: &'a dyn EventStore,
    settings: MonitorSettings,
}

impl<'a> TimeoutMonitor<'a> {
    pub fn new(store: &'a dyn EventStore, settings: MonitorSettings) -> Self {
        Self { store, settings }
    }

    /// Deadline check over already-correlated tracks. Pure.
    pub fn evaluate(&self, tracks: &[TaskTrack], now: DateTime<Utc>) -> Vec<Alert> {
        tracks
            .iter()
            .filter_map(|track| self.check(track, now))
            .collect()
    }

    fn check(&self, track: &TaskTrack, now: DateTime<Utc>) -> Option<Alert> {
        let (kind, since, limit, message) = match track.phase {
            TaskPhase::Requested => {
                let since = track.requested_at?;
                let limit = self.settings.ack_timeout_secs;
                (AlertKind::TimeoutAck, since, limit, "no ACK after REQUEST")
            }
            TaskPhase::Acked => {
                let since = track.reference_time()?;
                let limit = self.settings.result_timeout_secs;
                let message = if track.requested_at.is_some() {
                    "no RESULT after REQUEST"
                } else {
                    "no RESULT after ACK"
                };
                (AlertKind::TimeoutResult, since, limit, message)
            }
            TaskPhase::NoRequest | TaskPhase::Resulted => return None,
        };

        let overdue = now - since;
        if overdue <= Duration::seconds(limit) {
            return None;
        }
        let elapsed = overdue.num_seconds();
        Some(Alert {
            task_id: track.task_id.clone(),
            kind,
            severity: kind.severity(),
            since,
            elapsed_secs: elapsed,
            message: format!(
                "{} {message} for {} (limit {})",
                kind.as_str(),
                alert::human_duration(elapsed),
                alert::human_duration(limit)
            ),
        })
    }

    /// One monitor pass at `now`.
    pub fn run(&self, now: DateTime<Utc>) -> GateResult<MonitorReport> {
        let tracks = correlate(&self.store.read_events()?);
        let alerts = self.evaluate(&tracks, now);

        let state = if alerts.is_empty() {
            if self.store.remove_artifact(PROCESS_ALERT)? {
                info!("deadlines met again, previous alert cleared");
            }
            ExecutorState::ok(
                format!("{} task(s) tracked, all within deadlines", tracks.len()),
                now,
            )
        } else {
            self.store
                .write_artifact(PROCESS_ALERT, alert::render(&alerts, now).as_bytes())?;
            for a in &alerts {
                warn!(task = %a.task_id, kind = a.kind.as_str(), elapsed_secs = a.elapsed_secs, "protocol deadline missed");
                self.store.append_event(
                    &EventLogEntry::new(kinds::TIMEOUT_DETECTED, Some(a.task_id.clone()), now)
                        .with_field("alert", a.kind.as_str())
                        .with_field("severity", a.severity.as_str())
                        .with_field("since", a.since.to_rfc3339())
                        .with_field("elapsedSecs", a.elapsed_secs),
                )?;
            }
            ExecutorState {
                status: ExecutorStatus::Timeout,
                message: format!("{} protocol deadline(s) missed", alerts.len()),
                alerts: alerts.clone(),
                last_update: now,
            }
        };

        self.write_state(&state)?;
        info!(
            tasks = tracks.len(),
            alerts = alerts.len(),
            status = ?state.status,
            "monitor pass complete"
        );
        Ok(MonitorReport {
            tracks,
            alerts,
            state,
        })
    }

    pub fn status(&self) -> GateResult<StatusView> {
        Ok(StatusView {
            state: self.read_state()?,
            tracks: correlate(&self.store.read_events()?),
        })
    }

    /// Drop the alert file and reset the state to `OK`.
    ///
    /// The next `run` raises the alerts again if the deadlines are still
    /// missed.
    pub fn clear(&self, now: DateTime<Utc>) -> GateResult<ExecutorState> {
        let removed = self.store.remove_artifact(PROCESS_ALERT)?;
        let state = ExecutorState::ok("alerts cleared by operator", now);
        self.write_state(&state)?;
        info!(removed_alert = removed, "alert state cleared");
        Ok(state)
    }

    pub fn read_state(&self) -> GateResult<Option<ExecutorState>> {
        let Some(bytes) = self.store.read_artifact(EXECUTOR_STATE)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| GateError::read(EXECUTOR_STATE, e))
    }

    fn write_state(&self, state: &ExecutorState) -> GateResult<()> {
        let bytes = canonical_json(state).map_err(|e| GateError::write(EXECUTOR_STATE, e))?;
        self.store.write_artifact(EXECUTOR_STATE, &bytes)
    }
}
