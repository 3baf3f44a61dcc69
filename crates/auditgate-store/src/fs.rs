//! Directory-backed implementation of `EventStore`.
//!
//! Artifacts are written to a hidden temporary file in the same directory,
//! synced, then renamed over the final name. Readers therefore see either the
//! previous version or the complete new one. The guardrail and `list_artifacts`
//! skip the temporaries an interrupted write can leave behind.
//!
//! The event log is opened in append mode for every entry and synced before
//! returning. Appended timestamps are clamped so they never decrease, even
//! when the wall clock steps backwards between runs.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use auditgate_contracts::{
    error::{GateError, GateResult},
    event::EventLogEntry,
    layout::{self, EVENT_LOG},
};
use auditgate_core::traits::EventStore;

/// An `EventStore` rooted at one directory.
#[derive(Debug)]
pub struct FsEventStore {
    dir: PathBuf,
    /// Latest timestamp in the event log, seeded from disk on open.
    last_event_at: Mutex<Option<DateTime<Utc>>>,
}

impl FsEventStore {
    /// Open (creating if needed) the store at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> GateResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| GateError::write(dir.display().to_string(), e))?;

        let store = Self {
            dir,
            last_event_at: Mutex::new(None),
        };
        let seed = store.read_events()?.iter().map(|e| e.timestamp).max();
        if let Ok(mut last) = store.last_event_at.lock() {
            *last = seed;
        }
        debug!(dir = %store.dir.display(), "event store opened");
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve `name` inside the store, refusing anything that could escape it.
    fn path_for(&self, name: &str) -> GateResult<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(GateError::write(name, "artifact names must be plain file names"));
        }
        Ok(self.dir.join(name))
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl EventStore for FsEventStore {
    fn write_artifact(&self, name: &str, bytes: &[u8]) -> GateResult<()> {
        let target = self.path_for(name)?;
        let tmp = self.dir.join(format!(".{name}.{}.tmp", Uuid::new_v4().simple()));

        if let Err(e) = write_synced(&tmp, bytes).and_then(|()| fs::rename(&tmp, &target)) {
            let _ = fs::remove_file(&tmp);
            return Err(GateError::write(name, e));
        }
        debug!(artifact = %name, bytes = bytes.len(), "artifact written");
        Ok(())
    }

    fn read_artifact(&self, name: &str) -> GateResult<Option<Vec<u8>>> {
        let path = self.path_for(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GateError::read(name, e)),
        }
    }

    fn remove_artifact(&self, name: &str) -> GateResult<bool> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(GateError::write(name, e)),
        }
    }

    fn list_artifacts(&self) -> GateResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| GateError::read(self.dir.display().to_string(), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GateError::read(self.dir.display().to_string(), e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
                continue;
            };
            if !layout::is_temporary(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn append_event(&self, entry: &EventLogEntry) -> GateResult<()> {
        let mut last = self
            .last_event_at
            .lock()
            .map_err(|e| GateError::write(EVENT_LOG, format!("event log lock poisoned: {e}")))?;

        let mut entry = entry.clone();
        if let Some(floor) = *last {
            if entry.timestamp < floor {
                debug!(kind = %entry.kind, from = %entry.timestamp, to = %floor, "clamping event timestamp");
                entry.timestamp = floor;
            }
        }

        let mut line = serde_json::to_string(&entry).map_err(|e| GateError::write(EVENT_LOG, e))?;
        line.push('\n');

        let path = self.dir.join(EVENT_LOG);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| GateError::write(EVENT_LOG, e))?;
        file.write_all(line.as_bytes())
            .and_then(|()| file.sync_data())
            .map_err(|e| GateError::write(EVENT_LOG, e))?;

        *last = Some(entry.timestamp);
        Ok(())
    }

    fn read_events(&self) -> GateResult<Vec<EventLogEntry>> {
        let path = self.dir.join(EVENT_LOG);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GateError::read(EVENT_LOG, e)),
        };

        let mut events = Vec::new();
        for (n, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EventLogEntry>(line) {
                Ok(entry) => events.push(entry),
                Err(e) => warn!(line = n + 1, error = %e, "skipping malformed event log line"),
            }
        }
        Ok(events)
    }
}
