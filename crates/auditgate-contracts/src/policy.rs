//! Policy decision types.
//!
//! The policy engine turns CI statuses, the diff, and the auditor signal into
//! a `PolicyDecision`. Reasons accumulate; the verdict is the most
//! restrictive outcome any of them implies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::artifact::Verdict;

/// A single rule that fired during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// At least one of tests/lint/build is not `pass`.
    StatusesNotGreen,
    /// The auditor reported governance document violations.
    DocumentoMestreViolations,
    /// The diff touches payment, auth, webhook or security-rule code.
    SensitiveAreaChange,
    /// The auditor rated the change HIGH risk.
    HighRisk,
    /// The auditor rated the change MEDIUM risk.
    MediumRisk,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusesNotGreen => "statuses_not_green",
            Self::DocumentoMestreViolations => "documento_mestre_violations",
            Self::SensitiveAreaChange => "sensitive_area_change",
            Self::HighRisk => "high_risk",
            Self::MediumRisk => "medium_risk",
        }
    }

    /// Deterministic gates force `REJECTED` no matter what the auditor said.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Self::MediumRisk)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engine's output: a binding verdict plus every rule that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub verdict: Verdict,
    pub reasons: Vec<Reason>,
}

impl PolicyDecision {
    /// Resolve the verdict from the accumulated reasons.
    ///
    /// - any blocking reason → `REJECTED`
    /// - only `medium_risk` → `NEEDS_CHANGES`
    /// - nothing fired → `APPROVED`
    pub fn from_reasons(reasons: Vec<Reason>) -> Self {
        let verdict = if reasons.iter().any(Reason::is_blocking) {
            Verdict::Rejected
        } else if reasons.contains(&Reason::MediumRisk) {
            Verdict::NeedsChanges
        } else {
            Verdict::Approved
        };
        Self { verdict, reasons }
    }

    pub fn reason_list(&self) -> String {
        format_reasons(&self.reasons)
    }
}

/// Comma-separated reason codes, or `none`.
pub fn format_reasons(reasons: &[Reason]) -> String {
    if reasons.is_empty() {
        return "none".to_string();
    }
    reasons
        .iter()
        .map(Reason::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
