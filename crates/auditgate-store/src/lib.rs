//! # auditgate-store
//!
//! Event stores for the auditgate PR audit pipeline.
//!
//! ## Overview
//!
//! [`FsEventStore`] is the production store: one flat directory holding the
//! ACK/RESULT artifacts, their proof records, `event-log.jsonl`,
//! `executor-state.json` and `process-alert.md`. Artifact writes are atomic
//! renames; the event log is append-only.
//!
//! [`InMemoryEventStore`] implements the same trait for tests and dry runs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auditgate_store::FsEventStore;
//! use auditgate_core::traits::EventStore;
//!
//! let store = FsEventStore::open(".audit")?;
//! store.write_artifact("audit-ack-PR_42.json", &bytes)?;
//! ```

pub mod fs;
pub mod memory;

pub use fs::FsEventStore;
pub use memory::InMemoryEventStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
