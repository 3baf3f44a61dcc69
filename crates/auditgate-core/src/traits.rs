//! Core trait definitions for the audit pipeline.
//!
//! These five traits define the trust boundary:
//!
//! - `Auditor`: untrusted signal source (an LLM behind HTTPS)
//! - `OutputVerifier`: trusted parser that turns raw auditor text into a
//!   `ParsedAuditorOutput`
//! - `PolicyEngine`: trusted, deterministic verdict
//! - `EventStore`: trusted sink for artifacts and the event log
//! - `ContextSource`: CI-supplied facts (diff, statuses, governance hash)
//!
//! The `ProtocolClient` wires them together in protocol order. Nothing the
//! auditor returns reaches the verdict except through the policy engine.

use auditgate_contracts::{
    auditor::{AuditorSignal, ParsedAuditorOutput},
    error::GateResult,
    event::EventLogEntry,
    policy::PolicyDecision,
    request::{ArtifactKey, AuditRequest, CiStatuses, GatheredContext},
};

/// The external reviewer.
///
/// Implementations block for at most their configured deadline and report a
/// miss as `GateError::AuditorTimeout`, never by hanging.
pub trait Auditor: Send + Sync {
    /// Model identifier recorded in proofs.
    fn model(&self) -> &str;

    /// Send the request and return the reply text exactly as received.
    fn review(&self, request: &AuditRequest) -> GateResult<String>;
}

/// Parses auditor text against the reply schema.
pub trait OutputVerifier: Send + Sync {
    /// Never fails: anything unparseable is `ParsedAuditorOutput::Invalid`.
    fn parse(&self, raw: &str) -> ParsedAuditorOutput;
}

/// The deterministic verdict function.
///
/// Implementations must be pure: the same inputs always produce the same
/// decision, with no dependence on time or hidden state.
pub trait PolicyEngine: Send + Sync {
    fn decide(&self, statuses: &CiStatuses, diff: &str, signal: &AuditorSignal) -> PolicyDecision;
}

/// The file-addressed store all protocol artifacts live in.
///
/// Artifacts are whole-file create/overwrite; readers never observe a
/// partially written artifact. The event log is append-only.
pub trait EventStore: Send + Sync {
    /// Create or replace the artifact `name` with `bytes`.
    fn write_artifact(&self, name: &str, bytes: &[u8]) -> GateResult<()>;

    /// Raw bytes of `name`, or `None` when it does not exist.
    fn read_artifact(&self, name: &str) -> GateResult<Option<Vec<u8>>>;

    /// Delete `name`. Returns whether it existed.
    fn remove_artifact(&self, name: &str) -> GateResult<bool>;

    /// Names of every artifact in the store, sorted.
    fn list_artifacts(&self) -> GateResult<Vec<String>>;

    /// Append one entry to the event log.
    fn append_event(&self, entry: &EventLogEntry) -> GateResult<()>;

    /// Every readable entry in append order. Malformed lines are skipped.
    fn read_events(&self) -> GateResult<Vec<EventLogEntry>>;
}

/// Where the diff, CI statuses and governance fingerprint come from.
pub trait ContextSource: Send + Sync {
    fn gather(&self, key: &ArtifactKey) -> GateResult<GatheredContext>;
}
