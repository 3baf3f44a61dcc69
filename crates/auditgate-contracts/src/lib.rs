//! # auditgate-contracts
//!
//! Shared types, file layout, and error contracts for the auditgate PR audit
//! pipeline.
//!
//! All crates in the workspace import from here. No I/O lives in this crate
//! beyond reading the configuration file.

pub mod artifact;
pub mod auditor;
pub mod config;
pub mod digest;
pub mod error;
pub mod event;
pub mod layout;
pub mod policy;
pub mod proof;
pub mod request;

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use artifact::{AuditAck, AuditResult, ArtifactType, RiskLevel, Verdict};
    use auditor::{AuditorOutput, ParsedAuditorOutput};
    use config::GateConfig;
    use error::GateError;
    use policy::{PolicyDecision, Reason};
    use proof::{ProofOfOrigin, ProofRecord, PROOF_SOURCE};
    use request::{ArtifactKey, CiStatus, CiStatuses};

    // ── ArtifactKey ──────────────────────────────────────────────────────────

    #[test]
    fn artifact_key_renders_filename_fragment() {
        assert_eq!(ArtifactKey::Pr(42).to_string(), "PR_42");
        assert_eq!(ArtifactKey::Week("2026-W42".into()).to_string(), "WEEK_2026-W42");
    }

    #[test]
    fn week_ids_must_be_file_name_safe() {
        let mut run = request::RunContext {
            key: ArtifactKey::Week("2026-W42".into()),
            sha: "4f1c2a".into(),
            actor: "octocat".into(),
            repo: "acme/marketplace".into(),
            run_id: "1".into(),
            run_attempt: 1,
        };
        assert!(run.validate().is_ok());

        for week in ["a/b", "a\\b", "..", "2026 W42"] {
            run.key = ArtifactKey::Week(week.into());
            assert!(
                matches!(run.validate(), Err(GateError::ConfigError { .. })),
                "{week} must be rejected"
            );
        }
    }

    #[test]
    fn ack_serializes_flat_pr_number() {
        let ack = AuditAck::new(
            ArtifactKey::Pr(7),
            Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap(),
            "abc".to_string(),
        );
        let value = serde_json::to_value(&ack).unwrap();
        assert_eq!(value["type"], "ACK");
        assert_eq!(value["prNumber"], 7);
        assert_eq!(value["context_summary_hash"], "abc");
        assert!(value.get("weekId").is_none());
    }

    #[test]
    fn result_serializes_protocol_field_names() {
        let result = AuditResult {
            artifact_type: ArtifactType::Result,
            key: ArtifactKey::Week("2026-W42".into()),
            verdict: Verdict::NeedsChanges,
            reasons: vec![Reason::MediumRisk],
            risk_level: RiskLevel::Medium,
            findings: vec![],
            doc_mestre_violations: vec![],
            placeholder: false,
            emitted_at_utc: Utc::now(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "RESULT");
        assert_eq!(value["weekId"], "2026-W42");
        assert_eq!(value["verdict"], "NEEDS_CHANGES");
        assert_eq!(value["risk_level"], "MEDIUM");
        assert_eq!(value["reasons"], json!(["medium_risk"]));
    }

    // ── CI statuses ──────────────────────────────────────────────────────────

    #[test]
    fn only_literal_pass_is_green() {
        assert!(CiStatus::new("pass").is_pass());
        assert!(CiStatus::new(" PASS ").is_pass());
        assert!(!CiStatus::new("success").is_pass());
        assert!(!CiStatus::new("").is_pass());
        assert!(!CiStatus::unknown().is_pass());
    }

    #[test]
    fn failing_lists_red_gates_in_order() {
        let statuses = CiStatuses {
            tests: CiStatus::new("fail"),
            lint: CiStatus::pass(),
            build: CiStatus::unknown(),
        };
        assert!(!statuses.all_green());
        assert_eq!(statuses.failing(), vec!["tests", "build"]);
        assert!(CiStatuses::all_pass().all_green());
    }

    // ── PolicyDecision ───────────────────────────────────────────────────────

    #[test]
    fn reasons_format_as_comma_separated_codes() {
        assert_eq!(policy::format_reasons(&[]), "none");
        let decision =
            PolicyDecision::from_reasons(vec![Reason::StatusesNotGreen, Reason::HighRisk]);
        assert_eq!(decision.reason_list(), "statuses_not_green, high_risk");
        assert_eq!(policy::format_reasons(&decision.reasons), decision.reason_list());
    }

    #[test]
    fn decision_escalates_to_most_restrictive() {
        assert_eq!(PolicyDecision::from_reasons(vec![]).verdict, Verdict::Approved);
        assert_eq!(
            PolicyDecision::from_reasons(vec![Reason::MediumRisk]).verdict,
            Verdict::NeedsChanges
        );
        assert_eq!(
            PolicyDecision::from_reasons(vec![Reason::MediumRisk, Reason::SensitiveAreaChange])
                .verdict,
            Verdict::Rejected
        );
    }

    // ── Auditor output ───────────────────────────────────────────────────────

    #[test]
    fn invalid_reply_collapses_to_high_risk() {
        let parsed = ParsedAuditorOutput::Invalid {
            raw: "not json".to_string(),
            reason: "expected value".to_string(),
        };
        let output = parsed.into_output();
        assert_eq!(output.risk_level, RiskLevel::High);
        assert_eq!(output.findings, vec!["Invalid JSON"]);
        assert_eq!(output.doc_mestre_violations, vec!["invalid_response"]);
    }

    #[test]
    fn auditor_output_rejects_unknown_fields() {
        let raw = r#"{"risk_level":"LOW","findings":[],"doc_mestre_violations":[],"verdict":"APPROVED"}"#;
        assert!(serde_json::from_str::<AuditorOutput>(raw).is_err());
    }

    // ── Proof records ────────────────────────────────────────────────────────

    #[test]
    fn proof_text_parses_back_with_hash_line() {
        let proof = ProofOfOrigin {
            source: PROOF_SOURCE.to_string(),
            artifact: "audit-result-PR_3.json".to_string(),
            workflow_run_id: "991".to_string(),
            run_attempt: 2,
            actor: "octocat".to_string(),
            repo: "acme/market".to_string(),
            sha: "deadbeef".to_string(),
            pr_number: Some(3),
            week_id: None,
            timestamp_utc: Utc::now(),
            model: "gpt-4o-mini".to_string(),
            input_hash_sha256: "11".repeat(32),
            output_hash_sha256: "ab".repeat(32),
        };

        let record = ProofRecord::parse(&proof.to_text());
        assert_eq!(record.hash.as_deref(), Some("ab".repeat(32).as_str()));
        assert_eq!(record.get("pr_number"), Some("3"));
        assert_eq!(record.get("run_attempt"), Some("2"));
        assert_eq!(record.get("output_hash_sha256"), record.hash.as_deref());
        assert!(record.get("week_id").is_none());
    }

    #[test]
    fn proof_record_without_hash_line() {
        let record = ProofRecord::parse("source=manual\nnot a field\n\n");
        assert!(record.hash.is_none());
        assert_eq!(record.get("source"), Some("manual"));
    }

    // ── Layout ───────────────────────────────────────────────────────────────

    #[test]
    fn protected_artifacts_map_to_their_proofs() {
        let ack = layout::protected_artifact("audit-ack-PR_9.json").unwrap();
        assert_eq!(ack.proof_text, "proof-of-origin-ack-PR_9.txt");
        assert_eq!(ack.proof_text, layout::ack_proof_text(&ArtifactKey::Pr(9)));

        let result = layout::protected_artifact("audit-result-PR_9.json").unwrap();
        assert_eq!(result.proof_text, layout::result_proof_text(&ArtifactKey::Pr(9)));

        let generic = layout::protected_artifact("weekly-result.json").unwrap();
        assert_eq!(generic.proof_text, "proof-of-origin-weekly-result.txt");
    }

    #[test]
    fn non_artifacts_are_not_protected() {
        for name in [
            "proof-of-origin-PR_9.json",
            "executor-state.json",
            "event-log.jsonl",
            "audit-result-PR_9.txt",
            ".audit-result-PR_9.json.tmp",
            "process-alert.md",
        ] {
            assert!(layout::protected_artifact(name).is_none(), "{name} must not match");
        }
    }

    // ── Config ───────────────────────────────────────────────────────────────

    #[test]
    fn empty_config_uses_defaults() {
        let config = GateConfig::from_toml_str("").unwrap();
        assert_eq!(config, GateConfig::default());
        assert_eq!(config.auditor.timeout_secs, 15);
        assert_eq!(config.monitor.ack_timeout_secs, 300);
        assert!(config.policy.extra_sensitive_keywords.is_empty());
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let config = GateConfig::from_toml_str(
            r#"
            [auditor]
            timeout_secs = 3

            [policy]
            extra_sensitive_keywords = ["billing"]
            "#,
        )
        .unwrap();
        assert_eq!(config.auditor.timeout_secs, 3);
        assert_eq!(config.auditor.api_key_env, "AUDITOR_API_KEY");
        assert_eq!(config.policy.extra_sensitive_keywords, vec!["billing"]);
        assert_eq!(config.policy.trunk_branch, "main");
    }

    #[test]
    fn malformed_config_is_config_error() {
        match GateConfig::from_toml_str("[auditor\ntimeout_secs = ") {
            Err(GateError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse config TOML"), "{reason}")
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    // ── Digest ───────────────────────────────────────────────────────────────

    #[test]
    fn sha256_known_vector_and_case_insensitive_compare() {
        let h = digest::sha256_hex(b"abc");
        assert_eq!(h, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
        assert!(digest::hashes_match(&h, &h.to_uppercase()));
        assert!(!digest::hashes_match(&h, &digest::sha256_hex(b"abd")));
    }

    // ── GateError display messages ───────────────────────────────────────────

    #[test]
    fn error_display_messages() {
        let err = GateError::write("audit-ack-PR_1.json", "disk full");
        assert!(err.to_string().contains("audit-ack-PR_1.json"));
        assert!(err.to_string().contains("disk full"));

        let err = GateError::AuditorTimeout { after_secs: 15 };
        assert!(err.to_string().contains("15s"));
        assert!(err.is_auditor_unavailable());

        let err = GateError::MissingArgument { name: "sha".into() };
        assert!(err.to_string().contains("'sha'"));
        assert!(!err.is_auditor_unavailable());
    }
}
