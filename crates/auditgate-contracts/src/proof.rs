//! Proof-of-origin records.
//!
//! A proof binds one artifact's exact bytes to the CI execution that produced
//! them. It is written twice: as JSON for tooling, and as a flat text record
//! the guardrail reads. The text record ends with a `Hash:` line that repeats
//! `output_hash_sha256`.
//!
//! Text layout:
//!
//! ```text
//! source=auditgate-protocol-client
//! artifact=audit-result-PR_42.json
//! workflow_run_id=9912
//! run_attempt=1
//! actor=octocat
//! repo=acme/marketplace
//! sha=4f1c…
//! pr_number=42
//! timestamp_utc=2026-10-19T12:00:00+00:00
//! model=gpt-4o-mini
//! input_hash_sha256=…
//! output_hash_sha256=…
//! Hash: …
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `source` value written by the ProtocolClient.
pub const PROOF_SOURCE: &str = "auditgate-protocol-client";

/// Provenance of one ACK or RESULT artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfOrigin {
    pub source: String,
    /// Filename of the artifact this proof binds.
    pub artifact: String,
    pub workflow_run_id: String,
    pub run_attempt: u32,
    pub actor: String,
    pub repo: String,
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_id: Option<String>,
    pub timestamp_utc: DateTime<Utc>,
    pub model: String,
    /// SHA-256 of the canonical `AuditRequest`.
    pub input_hash_sha256: String,
    /// SHA-256 of the artifact's raw bytes on disk.
    pub output_hash_sha256: String,
}

impl ProofOfOrigin {
    /// Render the flat key=value text record.
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!("source={}", self.source),
            format!("artifact={}", self.artifact),
            format!("workflow_run_id={}", self.workflow_run_id),
            format!("run_attempt={}", self.run_attempt),
            format!("actor={}", self.actor),
            format!("repo={}", self.repo),
            format!("sha={}", self.sha),
        ];
        if let Some(pr) = self.pr_number {
            lines.push(format!("pr_number={pr}"));
        }
        if let Some(week) = &self.week_id {
            lines.push(format!("week_id={week}"));
        }
        lines.push(format!("timestamp_utc={}", self.timestamp_utc.to_rfc3339()));
        lines.push(format!("model={}", self.model));
        lines.push(format!("input_hash_sha256={}", self.input_hash_sha256));
        lines.push(format!("output_hash_sha256={}", self.output_hash_sha256));
        lines.push(format!("Hash: {}", self.output_hash_sha256));

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// A proof text record as read back from disk.
///
/// Unknown keys are kept and malformed lines are skipped. The guardrail
/// decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProofRecord {
    pub fields: BTreeMap<String, String>,
    /// Value of the `Hash:` line, if any.
    pub hash: Option<String>,
}

impl ProofRecord {
    pub fn parse(text: &str) -> Self {
        let mut record = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix("Hash:") {
                let value = rest.trim();
                if !value.is_empty() {
                    record.hash = Some(value.to_string());
                }
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                record
                    .fields
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        record
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}
