//! Auditor reply contract.
//!
//! The external auditor is untrusted: it supplies a risk signal, never a
//! decision. Its reply is parsed into `ParsedAuditorOutput`, and the invalid
//! branch has exactly one meaning downstream: HIGH risk.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::artifact::RiskLevel;

/// The structured reply the auditor must return.
///
/// Mirrors `output_schema()`: all three fields required, nothing else allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditorOutput {
    pub risk_level: RiskLevel,
    pub findings: Vec<String>,
    pub doc_mestre_violations: Vec<String>,
}

impl AuditorOutput {
    /// The output synthesized for a reply that failed to parse.
    pub fn invalid_response() -> Self {
        Self {
            risk_level: RiskLevel::High,
            findings: vec!["Invalid JSON".to_string()],
            doc_mestre_violations: vec!["invalid_response".to_string()],
        }
    }

    /// The conservative stand-in used when no auditor answered.
    ///
    /// LOW risk: the deterministic gates alone decide whether the run can be
    /// approved.
    pub fn placeholder(cause: &str) -> Self {
        Self {
            risk_level: RiskLevel::Low,
            findings: vec![format!("auditor unavailable, placeholder review: {cause}")],
            doc_mestre_violations: Vec::new(),
        }
    }
}

/// Result of parsing raw auditor text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAuditorOutput {
    Valid(AuditorOutput),
    Invalid {
        /// The text exactly as received.
        raw: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ParsedAuditorOutput {
    /// Collapse to an `AuditorOutput`, synthesizing HIGH risk for invalid replies.
    pub fn into_output(self) -> AuditorOutput {
        match self {
            Self::Valid(output) => output,
            Self::Invalid { .. } => AuditorOutput::invalid_response(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// What the policy engine sees from the auditor side of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditorSignal {
    pub output: AuditorOutput,
    /// True when `output` is the placeholder, not a real reply.
    pub placeholder: bool,
    /// Model identifier recorded in the proof.
    pub model: String,
}

impl AuditorSignal {
    pub const PLACEHOLDER_MODEL: &'static str = "placeholder";

    pub fn placeholder(cause: &str) -> Self {
        Self {
            output: AuditorOutput::placeholder(cause),
            placeholder: true,
            model: Self::PLACEHOLDER_MODEL.to_string(),
        }
    }
}

/// JSON Schema every auditor reply must satisfy.
///
/// Sent with the request (so endpoints supporting structured output enforce
/// it) and re-checked locally on the reply.
pub fn output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "risk_level": { "type": "string", "enum": ["LOW", "MEDIUM", "HIGH"] },
            "findings": { "type": "array", "items": { "type": "string" } },
            "doc_mestre_violations": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["risk_level", "findings", "doc_mestre_violations"],
        "additionalProperties": false
    })
}
