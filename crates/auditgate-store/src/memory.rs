//! In-memory implementation of `EventStore`.
//!
//! `InMemoryEventStore` keeps artifacts in a `BTreeMap` and the event log in a
//! `Vec`, both behind one `Mutex`. Clones share state, so a test can hand one
//! clone to a `ProtocolClient` and inspect the other afterwards.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use auditgate_contracts::{
    error::{GateError, GateResult},
    event::EventLogEntry,
    layout::EVENT_LOG,
};
use auditgate_core::traits::EventStore;

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct InMemoryState {
    pub(crate) files: BTreeMap<String, Vec<u8>>,
    pub(crate) events: Vec<EventLogEntry>,
}

// ── Public store ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, what: &str) -> GateResult<MutexGuard<'_, InMemoryState>> {
        self.state
            .lock()
            .map_err(|e| GateError::write(what, format!("store lock poisoned: {e}")))
    }
}

impl EventStore for InMemoryEventStore {
    fn write_artifact(&self, name: &str, bytes: &[u8]) -> GateResult<()> {
        self.lock(name)?.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read_artifact(&self, name: &str) -> GateResult<Option<Vec<u8>>> {
        Ok(self.lock(name)?.files.get(name).cloned())
    }

    fn remove_artifact(&self, name: &str) -> GateResult<bool> {
        Ok(self.lock(name)?.files.remove(name).is_some())
    }

    fn list_artifacts(&self) -> GateResult<Vec<String>> {
        Ok(self.lock("store")?.files.keys().cloned().collect())
    }

    /// Appends with the same non-decreasing timestamp rule as the file store.
    fn append_event(&self, entry: &EventLogEntry) -> GateResult<()> {
        let mut state = self.lock(EVENT_LOG)?;
        let mut entry = entry.clone();
        if let Some(floor) = state.events.last().map(|e| e.timestamp) {
            entry.timestamp = entry.timestamp.max(floor);
        }
        state.events.push(entry);
        Ok(())
    }

    fn read_events(&self) -> GateResult<Vec<EventLogEntry>> {
        Ok(self.lock(EVENT_LOG)?.events.clone())
    }
}
