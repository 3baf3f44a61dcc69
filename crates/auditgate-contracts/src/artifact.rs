//! The ACK and RESULT protocol artifacts.
//!
//! Both are written once per run under a key-derived filename and bound to
//! the run by a proof-of-origin record. Neither is ever patched in place; a
//! re-run overwrites the whole file.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{policy::Reason, request::ArtifactKey};

/// The `type` discriminant carried by every protocol artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactType {
    #[serde(rename = "ACK")]
    Ack,
    #[serde(rename = "RESULT")]
    Result,
}

/// The merge verdict. Only `Approved` opens the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approved,
    NeedsChanges,
    Rejected,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::NeedsChanges => "NEEDS_CHANGES",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk signal reported by the auditor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgment that a REQUEST was assembled and is about to be sent.
///
/// Written before the auditor call so that a crash or timeout during the
/// call still leaves evidence the run happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditAck {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    #[serde(flatten)]
    pub key: ArtifactKey,
    pub received_at_utc: DateTime<Utc>,
    /// SHA-256 of the canonical JSON of the `AuditRequest`.
    pub context_summary_hash: String,
}

impl AuditAck {
    pub fn new(key: ArtifactKey, received_at_utc: DateTime<Utc>, context_summary_hash: String) -> Self {
        Self {
            artifact_type: ArtifactType::Ack,
            key,
            received_at_utc,
            context_summary_hash,
        }
    }
}

/// The final verdict of one audit run.
///
/// Only ever constructed from a `PolicyDecision`; the auditor's output
/// contributes `risk_level`, `findings` and `doc_mestre_violations` but never
/// the verdict itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    #[serde(flatten)]
    pub key: ArtifactKey,
    pub verdict: Verdict,
    pub reasons: Vec<Reason>,
    pub risk_level: RiskLevel,
    pub findings: Vec<String>,
    pub doc_mestre_violations: Vec<String>,
    /// True when the auditor was unreachable or unconfigured.
    #[serde(default)]
    pub placeholder: bool,
    pub emitted_at_utc: DateTime<Utc>,
}
