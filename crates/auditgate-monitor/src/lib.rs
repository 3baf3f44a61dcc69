//! # auditgate-monitor
//!
//! Detects protocol runs that stalled between phases.
//!
//! [`TimeoutMonitor`] correlates the REQUEST/ACK/RESULT entries of the event
//! log per task, raises `TIMEOUT_ACK` / `TIMEOUT_RESULT` alerts for missed
//! deadlines, and maintains `executor-state.json` and `process-alert.md`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auditgate_monitor::TimeoutMonitor;
//!
//! let report = TimeoutMonitor::new(&store, config.monitor.clone()).run(Utc::now())?;
//! ```

pub mod alert;
pub mod monitor;

pub use monitor::{MonitorReport, StatusView, TimeoutMonitor};

// ── Tests ─────────────────────────────────────────────────────────────────────
