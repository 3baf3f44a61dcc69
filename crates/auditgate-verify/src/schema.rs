//! Schema-based parsing of auditor replies.
//!
//! `SchemaOutputVerifier` implements the `OutputVerifier` trait from
//! auditgate-core. A reply is accepted only if all three phases pass:
//!
//! 1. **Syntax**: the trimmed text is one JSON document.
//! 2. **Structure**: the document satisfies `output_schema()` via the
//!    `jsonschema` crate. Every violation is collected into the reason.
//! 3. **Typing**: the document deserializes into `AuditorOutput`.
//!
//! Anything else becomes `ParsedAuditorOutput::Invalid`, which downstream
//! means HIGH risk. There is no partial acceptance.

use jsonschema::Validator;
use serde_json::Value;
use tracing::{debug, warn};

use auditgate_contracts::{
    auditor::{output_schema, AuditorOutput, ParsedAuditorOutput},
    error::{GateError, GateResult},
};
use auditgate_core::traits::OutputVerifier;

/// Validates auditor replies against the compiled reply schema.
pub struct SchemaOutputVerifier {
    validator: Validator,
}

impl SchemaOutputVerifier {
    /// Compile the reply schema.
    ///
    /// Returns `GateError::SchemaValidation` if the schema document does not
    /// compile.
    pub fn new() -> GateResult<Self> {
        Self::with_schema(&output_schema())
    }

    pub fn with_schema(schema: &Value) -> GateResult<Self> {
        let validator = jsonschema::validator_for(schema).map_err(|e| GateError::SchemaValidation {
            reason: format!("invalid JSON Schema document: {e}"),
        })?;
        Ok(Self { validator })
    }

    fn invalid(raw: &str, reason: String) -> ParsedAuditorOutput {
        warn!(%reason, "auditor reply failed validation");
        ParsedAuditorOutput::Invalid {
            raw: raw.to_string(),
            reason,
        }
    }
}

impl OutputVerifier for SchemaOutputVerifier {
    fn parse(&self, raw: &str) -> ParsedAuditorOutput {
        // ── Phase 1: syntax ──────────────────────────────────────────────────
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(v) => v,
            Err(e) => return Self::invalid(raw, format!("not valid JSON: {e}")),
        };

        // ── Phase 2: JSON Schema ─────────────────────────────────────────────
        let violations: Vec<String> = self
            .validator
            .iter_errors(&value)
            .map(|error| format!("at '{}': {}", error.instance_path, error))
            .collect();
        if !violations.is_empty() {
            return Self::invalid(raw, format!("schema violations: {}", violations.join("; ")));
        }

        // ── Phase 3: typed decode ────────────────────────────────────────────
        match serde_json::from_value::<AuditorOutput>(value) {
            Ok(output) => {
                debug!(
                    risk_level = %output.risk_level,
                    findings = output.findings.len(),
                    violations = output.doc_mestre_violations.len(),
                    "auditor reply accepted"
                );
                ParsedAuditorOutput::Valid(output)
            }
            Err(e) => Self::invalid(raw, format!("does not match reply type: {e}")),
        }
    }
}
