//! Run identity and request-context types.
//!
//! A `RunContext` is what the CI host hands the ProtocolClient: which PR (or
//! week), which commit, who triggered it, and which workflow run. The client
//! combines it with the gathered diff and CI statuses into an `AuditRequest`,
//! which lives only for the duration of one run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

/// The key every per-run artifact file is named after.
///
/// Serialized flattened into artifacts as either `"prNumber": 42` or
/// `"weekId": "2026-W42"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKey {
    /// A pull-request audit.
    #[serde(rename = "prNumber")]
    Pr(u64),
    /// The periodic system audit, keyed by ISO week (e.g. `2026-W42`).
    #[serde(rename = "weekId")]
    Week(String),
}

impl ArtifactKey {
    /// The PR number, if this is a pull-request key.
    pub fn pr_number(&self) -> Option<u64> {
        match self {
            Self::Pr(n) => Some(*n),
            Self::Week(_) => None,
        }
    }

    /// The week id, if this is a system-audit key.
    pub fn week_id(&self) -> Option<&str> {
        match self {
            Self::Pr(_) => None,
            Self::Week(w) => Some(w),
        }
    }
}

/// Renders the filename fragment: `PR_42` or `WEEK_2026-W42`.
///
/// The same string is used as the `taskId` in the event log.
impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pr(n) => write!(f, "PR_{n}"),
            Self::Week(w) => write!(f, "WEEK_{w}"),
        }
    }
}

/// The externally-verifiable execution the audit runs inside.
///
/// Every field is supplied by the CI host; none is measured locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    #[serde(flatten)]
    pub key: ArtifactKey,
    pub sha: String,
    pub actor: String,
    pub repo: String,
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(rename = "runAttempt")]
    pub run_attempt: u32,
}

impl RunContext {
    /// Reject contexts with empty identity fields, and week ids that cannot
    /// form part of an artifact file name.
    ///
    /// Called before any artifact I/O.
    pub fn validate(&self) -> GateResult<()> {
        let required = [
            ("sha", &self.sha),
            ("actor", &self.actor),
            ("repo", &self.repo),
            ("run-id", &self.run_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(GateError::MissingArgument {
                    name: name.to_string(),
                });
            }
        }
        if let ArtifactKey::Week(week) = &self.key {
            if week.trim().is_empty() {
                return Err(GateError::MissingArgument {
                    name: "week".to_string(),
                });
            }
            if !week
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(GateError::ConfigError {
                    reason: format!(
                        "week id '{week}' may only contain ASCII letters, digits, '-' and '_'"
                    ),
                });
            }
        }
        Ok(())
    }
}

/// One CI status string as injected by the pipeline.
///
/// Only the literal `pass` (case-insensitive) counts as green. Anything else,
/// including an absent variable, keeps the gate red.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CiStatus(pub String);

impl CiStatus {
    /// The value used when the pipeline did not inject a status.
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn pass() -> Self {
        Self("pass".to_string())
    }

    pub fn is_pass(&self) -> bool {
        self.0.trim().eq_ignore_ascii_case("pass")
    }
}

/// The three deterministic CI gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiStatuses {
    pub tests: CiStatus,
    pub lint: CiStatus,
    pub build: CiStatus,
}

impl CiStatuses {
    /// Convenience for tests and fixtures: every gate green.
    pub fn all_pass() -> Self {
        Self {
            tests: CiStatus::pass(),
            lint: CiStatus::pass(),
            build: CiStatus::pass(),
        }
    }

    pub fn all_green(&self) -> bool {
        self.tests.is_pass() && self.lint.is_pass() && self.build.is_pass()
    }

    /// Names of the gates that are not green, in fixed order.
    pub fn failing(&self) -> Vec<&'static str> {
        [("tests", &self.tests), ("lint", &self.lint), ("build", &self.build)]
            .into_iter()
            .filter(|(_, s)| !s.is_pass())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Everything gathered from the workspace for one run.
///
/// Produced by a `ContextSource`; the client never measures these itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatheredContext {
    /// Unified diff against the trunk branch.
    pub diff: String,
    pub statuses: CiStatuses,
    /// SHA-256 of the governance document excerpt.
    #[serde(rename = "docHash")]
    pub doc_hash: String,
}

/// The REQUEST phase: the full context sent to the auditor.
///
/// Ephemeral. It is hashed into the ACK and the proof records but never
/// written as its own file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRequest {
    #[serde(flatten)]
    pub run: RunContext,
    #[serde(rename = "requestedAt")]
    pub requested_at: DateTime<Utc>,
    pub diff: String,
    pub statuses: CiStatuses,
    #[serde(rename = "docHash")]
    pub doc_hash: String,
    /// Task ids the event log still shows without a RESULT.
    #[serde(rename = "pendingEvents")]
    pub pending_events: Vec<String>,
}
