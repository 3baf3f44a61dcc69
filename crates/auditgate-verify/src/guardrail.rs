//! The proof-of-origin guardrail.
//!
//! An independent merge gate: every ACK or RESULT artifact in the store must
//! have a proof text record whose `Hash:` equals the SHA-256 of the
//! artifact's current bytes. It never repairs anything and never stops at the
//! first problem; all violations are reported together.
//!
//! A run that stopped after its ACK (no RESULT yet) is a valid state here:
//! the ACK carries its own proof.

use std::fmt;

use tracing::{debug, info, warn};

use auditgate_contracts::{
    digest::{hashes_match, sha256_hex},
    error::{GateError, GateResult},
    layout::{protected_artifact, ProtectedArtifact},
    proof::ProofRecord,
};
use auditgate_core::traits::EventStore;

/// Why one artifact failed the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    MissingProof,
    MissingHashLine,
    HashMismatch { recorded: String, actual: String },
    /// `output_hash_sha256=` and `Hash:` in the same record disagree.
    InconsistentRecord { field: String, hash_line: String },
    /// The record's `artifact=` line names a different file.
    WrongArtifact { named: String },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingProof => f.write_str("no proof-of-origin record"),
            Self::MissingHashLine => f.write_str("proof record has no 'Hash:' line"),
            Self::HashMismatch { recorded, actual } => {
                write!(f, "hash mismatch: proof records {recorded}, artifact hashes to {actual}")
            }
            Self::InconsistentRecord { field, hash_line } => write!(
                f,
                "output_hash_sha256 {field} disagrees with Hash: {hash_line}"
            ),
            Self::WrongArtifact { named } => write!(f, "proof record is bound to '{named}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub artifact: String,
    pub proof: String,
    pub kind: ViolationKind,
}

impl From<&Violation> for GateError {
    fn from(v: &Violation) -> Self {
        GateError::Provenance {
            artifact: v.artifact.clone(),
            reason: format!("{} ({})", v.kind, v.proof),
        }
    }
}

/// Outcome of one guardrail pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardrailReport {
    /// Number of protected artifacts examined.
    pub checked: usize,
    pub violations: Vec<Violation>,
}

impl GuardrailReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// `0` when clean, `1` on any violation.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }
}

pub struct ProofGuardrail<'a> {
    store: &'a dyn EventStore,
}

impl<'a> ProofGuardrail<'a> {
    pub fn new(store: &'a dyn EventStore) -> Self {
        Self { store }
    }

    /// Check every protected artifact in the store.
    ///
    /// # Errors
    ///
    /// Only when the store itself cannot be listed or read. Provenance
    /// problems are violations in the report, not errors.
    pub fn audit(&self) -> GateResult<GuardrailReport> {
        let mut report = GuardrailReport::default();

        for name in self.store.list_artifacts()? {
            let Some(protected) = protected_artifact(&name) else {
                continue;
            };
            report.checked += 1;
            if let Some(kind) = self.check(&protected)? {
                warn!(artifact = %protected.name, proof = %protected.proof_text, %kind, "provenance violation");
                report.violations.push(Violation {
                    artifact: protected.name,
                    proof: protected.proof_text,
                    kind,
                });
            }
        }

        info!(
            checked = report.checked,
            violations = report.violations.len(),
            "guardrail pass complete"
        );
        Ok(report)
    }

    fn check(&self, protected: &ProtectedArtifact) -> GateResult<Option<ViolationKind>> {
        let Some(proof_bytes) = self.store.read_artifact(&protected.proof_text)? else {
            return Ok(Some(ViolationKind::MissingProof));
        };
        let record = ProofRecord::parse(&String::from_utf8_lossy(&proof_bytes));
        let Some(recorded) = record.hash.clone() else {
            return Ok(Some(ViolationKind::MissingHashLine));
        };

        let Some(bytes) = self.store.read_artifact(&protected.name)? else {
            // Listed a moment ago, gone now: nothing left to vouch for.
            debug!(artifact = %protected.name, "artifact vanished during scan");
            return Ok(None);
        };
        let actual = sha256_hex(&bytes);
        if !hashes_match(&recorded, &actual) {
            return Ok(Some(ViolationKind::HashMismatch { recorded, actual }));
        }

        if let Some(field) = record.get("output_hash_sha256") {
            if !hashes_match(field, &recorded) {
                return Ok(Some(ViolationKind::InconsistentRecord {
                    field: field.to_string(),
                    hash_line: recorded,
                }));
            }
        }
        if let Some(named) = record.get("artifact") {
            if named != protected.name {
                return Ok(Some(ViolationKind::WrongArtifact {
                    named: named.to_string(),
                }));
            }
        }

        debug!(artifact = %protected.name, "proof verified");
        Ok(None)
    }
}
