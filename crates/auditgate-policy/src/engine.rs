//! The gate policy engine.
//!
//! `GatePolicyEngine` implements the `PolicyEngine` trait from auditgate-core.
//!
//! Evaluation algorithm (every rule is checked, reasons accumulate):
//!
//! 1. `statuses_not_green` if any of tests/lint/build is not `pass`.
//! 2. `documento_mestre_violations` if the auditor reported any.
//! 3. `sensitive_area_change` if the diff contains a sensitive keyword.
//! 4. `high_risk` / `medium_risk` from the auditor's risk level.
//!
//! The verdict is then the most restrictive outcome the reasons imply (see
//! `PolicyDecision::from_reasons`). Only rule 4 depends on the auditor alone,
//! and it can only make the verdict stricter.

use std::path::Path;

use tracing::{debug, warn};

use auditgate_contracts::{
    artifact::RiskLevel,
    auditor::AuditorSignal,
    config::PolicySettings,
    error::{GateError, GateResult},
    policy::{PolicyDecision, Reason},
    request::CiStatuses,
};
use auditgate_core::traits::PolicyEngine;

use crate::rule::{KeywordFile, SensitiveAreas};

/// A deterministic `PolicyEngine` over the sensitive-keyword set.
///
/// ```rust,ignore
/// use auditgate_policy::GatePolicyEngine;
///
/// let engine = GatePolicyEngine::from_settings(&config.policy);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GatePolicyEngine {
    areas: SensitiveAreas,
}

impl GatePolicyEngine {
    pub fn new(areas: SensitiveAreas) -> Self {
        Self { areas }
    }

    /// Build from the `[policy]` section of the gate configuration.
    pub fn from_settings(settings: &PolicySettings) -> Self {
        Self::new(SensitiveAreas::new(settings.extra_sensitive_keywords.iter().cloned()))
    }

    /// Parse `s` as a standalone keyword file.
    ///
    /// Returns `GateError::ConfigError` if the TOML is malformed.
    pub fn from_toml_str(s: &str) -> GateResult<Self> {
        let file: KeywordFile = toml::from_str(s).map_err(|e| GateError::ConfigError {
            reason: format!("failed to parse policy TOML: {e}"),
        })?;
        Ok(Self::new(SensitiveAreas::new(file.extra_sensitive_keywords)))
    }

    /// Read and parse the keyword file at `path`.
    pub fn from_file(path: &Path) -> GateResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GateError::ConfigError {
            reason: format!("failed to read policy file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn keywords(&self) -> &[String] {
        self.areas.keywords()
    }
}

impl PolicyEngine for GatePolicyEngine {
    fn decide(&self, statuses: &CiStatuses, diff: &str, signal: &AuditorSignal) -> PolicyDecision {
        let mut reasons = Vec::new();

        if !statuses.all_green() {
            debug!(failing = ?statuses.failing(), "CI statuses not green");
            reasons.push(Reason::StatusesNotGreen);
        }

        if !signal.output.doc_mestre_violations.is_empty() {
            debug!(
                count = signal.output.doc_mestre_violations.len(),
                "governance violations reported"
            );
            reasons.push(Reason::DocumentoMestreViolations);
        }

        let hits = self.areas.matches(diff);
        if !hits.is_empty() {
            warn!(keywords = ?hits, "diff touches a sensitive area");
            reasons.push(Reason::SensitiveAreaChange);
        }

        match signal.output.risk_level {
            RiskLevel::High => reasons.push(Reason::HighRisk),
            RiskLevel::Medium => reasons.push(Reason::MediumRisk),
            RiskLevel::Low => {}
        }

        let decision = PolicyDecision::from_reasons(reasons);
        debug!(
            verdict = %decision.verdict,
            reasons = %decision.reason_list(),
            placeholder = signal.placeholder,
            "policy decided"
        );
        decision
    }
}
