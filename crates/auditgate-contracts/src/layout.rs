//! File naming inside the event store directory.
//!
//! Names are derived from the `ArtifactKey`; nothing is content-addressed.
//! The guardrail uses `protected_artifact` to go from an artifact name to the
//! proof record that must sit next to it.

use crate::request::ArtifactKey;

pub const EVENT_LOG: &str = "event-log.jsonl";
pub const EXECUTOR_STATE: &str = "executor-state.json";
pub const PROCESS_ALERT: &str = "process-alert.md";

const ACK_PREFIX: &str = "audit-ack-";
const RESULT_PREFIX: &str = "audit-result-";
const PROOF_PREFIX: &str = "proof-of-origin-";

pub fn ack_file(key: &ArtifactKey) -> String {
    format!("{ACK_PREFIX}{key}.json")
}

pub fn result_file(key: &ArtifactKey) -> String {
    format!("{RESULT_PREFIX}{key}.json")
}

/// Proof JSON for the RESULT artifact.
pub fn result_proof_json(key: &ArtifactKey) -> String {
    format!("{PROOF_PREFIX}{key}.json")
}

/// Proof text record for the RESULT artifact.
pub fn result_proof_text(key: &ArtifactKey) -> String {
    format!("{PROOF_PREFIX}{key}.txt")
}

/// Proof JSON for the ACK artifact.
pub fn ack_proof_json(key: &ArtifactKey) -> String {
    format!("{PROOF_PREFIX}ack-{key}.json")
}

/// Proof text record for the ACK artifact.
pub fn ack_proof_text(key: &ArtifactKey) -> String {
    format!("{PROOF_PREFIX}ack-{key}.txt")
}

/// True for in-flight temporary files left by an interrupted atomic write.
pub fn is_temporary(name: &str) -> bool {
    name.starts_with('.') || name.ends_with(".tmp")
}

/// An artifact the guardrail requires a proof for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedArtifact {
    pub name: String,
    /// Name of the proof text record expected next to it.
    pub proof_text: String,
}

/// Classify `name` as an ACK/RESULT artifact, or `None` if it is not one.
///
/// Matching rules, in order:
///
/// 1. `audit-ack-{k}.json`    → `proof-of-origin-ack-{k}.txt`
/// 2. `audit-result-{k}.json` → `proof-of-origin-{k}.txt`
/// 3. any other `.json` containing `audit-ack` or `audit-result`, or ending in
///    `-result.json` → `proof-of-origin-{stem}.txt`
///
/// Proof files themselves and temporary files never match.
pub fn protected_artifact(name: &str) -> Option<ProtectedArtifact> {
    if is_temporary(name) || name.starts_with(PROOF_PREFIX) {
        return None;
    }
    let stem = name.strip_suffix(".json")?;

    let proof_text = if let Some(k) = stem.strip_prefix(ACK_PREFIX) {
        format!("{PROOF_PREFIX}ack-{k}.txt")
    } else if let Some(k) = stem.strip_prefix(RESULT_PREFIX) {
        format!("{PROOF_PREFIX}{k}.txt")
    } else if stem.contains("audit-ack") || stem.contains("audit-result") || stem.ends_with("-result") {
        format!("{PROOF_PREFIX}{stem}.txt")
    } else {
        return None;
    };

    Some(ProtectedArtifact {
        name: name.to_string(),
        proof_text,
    })
}
