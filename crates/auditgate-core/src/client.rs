//! The ProtocolClient: one REQUEST → ACK → RESULT cycle per CI run.
//!
//! Pipeline:
//!
//!   Context → REQUEST → ACK (+proof) → Auditor → Parse → Policy → RESULT (+proof)
//!
//! Ordering is the contract. The ACK and its proof are durable before the
//! auditor is contacted, and the RESULT is durable before its proof. The
//! verdict comes only from `PolicyEngine::decide`; the auditor contributes a
//! signal and nothing else.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use auditgate_contracts::{
    artifact::{ArtifactType, AuditAck, AuditResult, Verdict},
    auditor::{AuditorSignal, ParsedAuditorOutput},
    digest::{canonical_json, sha256_hex},
    error::{GateError, GateResult},
    event::{kinds, EventLogEntry},
    layout,
    proof::{ProofOfOrigin, PROOF_SOURCE},
    request::{AuditRequest, RunContext},
};

use crate::{
    correlation::open_tasks,
    traits::{Auditor, ContextSource, EventStore, OutputVerifier, PolicyEngine},
};

/// Process exit codes. The exit code is the CI merge gate.
pub mod exit {
    pub const APPROVED: i32 = 0;
    pub const INTERNAL_ERROR: i32 = 1;
    pub const NOT_APPROVED: i32 = 2;
}

/// Everything one completed run produced.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub ack: AuditAck,
    pub result: AuditResult,
    pub ack_proof: ProofOfOrigin,
    pub result_proof: ProofOfOrigin,
}

impl AuditOutcome {
    /// `0` only for `APPROVED`, `2` for every other verdict.
    pub fn exit_code(&self) -> i32 {
        match self.result.verdict {
            Verdict::Approved => exit::APPROVED,
            Verdict::NeedsChanges | Verdict::Rejected => exit::NOT_APPROVED,
        }
    }
}

/// Map a run's outcome onto the process exit code.
pub fn exit_code_for(outcome: &GateResult<AuditOutcome>) -> i32 {
    match outcome {
        Ok(outcome) => outcome.exit_code(),
        Err(_) => exit::INTERNAL_ERROR,
    }
}

/// Where one artifact's proof records go.
struct ProofNames {
    json: String,
    text: String,
}

/// `now`, but never earlier than `floor`.
fn not_before(floor: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(floor)
}

/// Runs audit cycles against one event store.
///
/// `auditor` is `None` when no credential is configured; every run then uses
/// the placeholder signal.
pub struct ProtocolClient {
    store: Box<dyn EventStore>,
    context: Box<dyn ContextSource>,
    auditor: Option<Box<dyn Auditor>>,
    verifier: Box<dyn OutputVerifier>,
    policy: Box<dyn PolicyEngine>,
}

impl ProtocolClient {
    pub fn new(
        store: Box<dyn EventStore>,
        context: Box<dyn ContextSource>,
        auditor: Option<Box<dyn Auditor>>,
        verifier: Box<dyn OutputVerifier>,
        policy: Box<dyn PolicyEngine>,
    ) -> Self {
        Self {
            store,
            context,
            auditor,
            verifier,
            policy,
        }
    }

    /// Execute one full audit cycle for `run`.
    ///
    /// # Errors
    ///
    /// `MissingArgument` or `ConfigError` for an invalid run context (before
    /// any I/O),
    /// `Context` when the diff cannot be gathered, and `ArtifactWrite` when
    /// any artifact cannot be persisted. Auditor failures are not errors:
    /// they degrade to the placeholder signal.
    pub fn run_audit(&self, run: &RunContext) -> GateResult<AuditOutcome> {
        run.validate()?;
        let key = &run.key;
        let task_id = key.to_string();

        // ── REQUEST ──────────────────────────────────────────────────────────
        let gathered = self.context.gather(key)?;
        let pending_events = open_tasks(&self.store.read_events()?)
            .into_iter()
            .filter(|t| *t != task_id)
            .collect();

        let request = AuditRequest {
            run: run.clone(),
            requested_at: Utc::now(),
            diff: gathered.diff,
            statuses: gathered.statuses,
            doc_hash: gathered.doc_hash,
            pending_events,
        };
        let request_bytes = canonical_json(&request)
            .map_err(|e| GateError::write("audit-request", e))?;
        let input_hash = sha256_hex(&request_bytes);

        self.store.append_event(
            &EventLogEntry::new(kinds::REQUEST, Some(task_id.clone()), request.requested_at)
                .with_field("sha", run.sha.clone())
                .with_field("runId", run.run_id.clone())
                .with_field("runAttempt", run.run_attempt),
        )?;
        debug!(%key, input_hash = %input_hash, "request assembled");

        // ── ACK ──────────────────────────────────────────────────────────────
        //
        // Durable before the auditor call, so a crash or timeout mid-call still
        // leaves a provable trail.
        let ack = AuditAck::new(key.clone(), not_before(request.requested_at), input_hash.clone());
        let ack_name = layout::ack_file(key);
        let ack_bytes = canonical_json(&ack).map_err(|e| GateError::write(&ack_name, e))?;
        self.store.write_artifact(&ack_name, &ack_bytes)?;

        let ack_proof = self.write_proof(
            run,
            &ack_name,
            &ack_bytes,
            self.configured_model(),
            &input_hash,
            ack.received_at_utc,
            ProofNames {
                json: layout::ack_proof_json(key),
                text: layout::ack_proof_text(key),
            },
        )?;
        self.store.append_event(
            &EventLogEntry::new(kinds::ACK, Some(task_id.clone()), ack.received_at_utc)
                .with_field("context_summary_hash", input_hash.clone()),
        )?;
        info!(%key, artifact = %ack_name, "ACK written");

        // ── Auditor + policy ─────────────────────────────────────────────────
        let signal = self.consult_auditor(&request);
        let decision = self
            .policy
            .decide(&request.statuses, &request.diff, &signal);

        // ── RESULT ───────────────────────────────────────────────────────────
        let result = AuditResult {
            artifact_type: ArtifactType::Result,
            key: key.clone(),
            verdict: decision.verdict,
            reasons: decision.reasons.clone(),
            risk_level: signal.output.risk_level,
            findings: signal.output.findings.clone(),
            doc_mestre_violations: signal.output.doc_mestre_violations.clone(),
            placeholder: signal.placeholder,
            emitted_at_utc: not_before(ack.received_at_utc),
        };
        let result_name = layout::result_file(key);
        let result_bytes =
            canonical_json(&result).map_err(|e| GateError::write(&result_name, e))?;
        self.store.write_artifact(&result_name, &result_bytes)?;

        let result_proof = self.write_proof(
            run,
            &result_name,
            &result_bytes,
            &signal.model,
            &input_hash,
            result.emitted_at_utc,
            ProofNames {
                json: layout::result_proof_json(key),
                text: layout::result_proof_text(key),
            },
        )?;
        self.store.append_event(
            &EventLogEntry::new(kinds::RESULT, Some(task_id), result.emitted_at_utc)
                .with_field("verdict", result.verdict.as_str())
                .with_field("risk_level", result.risk_level.as_str()),
        )?;

        info!(
            %key,
            verdict = %result.verdict,
            risk_level = %result.risk_level,
            reasons = %decision.reason_list(),
            placeholder = result.placeholder,
            "RESULT written"
        );

        Ok(AuditOutcome {
            ack,
            result,
            ack_proof,
            result_proof,
        })
    }

    fn configured_model(&self) -> &str {
        self.auditor
            .as_ref()
            .map(|a| a.model())
            .unwrap_or(AuditorSignal::PLACEHOLDER_MODEL)
    }

    /// Call the auditor and reduce whatever happens to a signal.
    ///
    /// Missing credential or any call failure → placeholder. Unparseable
    /// reply → synthesized HIGH risk.
    fn consult_auditor(&self, request: &AuditRequest) -> AuditorSignal {
        let Some(auditor) = &self.auditor else {
            warn!(key = %request.run.key, "no auditor credential configured, using placeholder review");
            return AuditorSignal::placeholder("no auditor credential configured");
        };

        match auditor.review(request) {
            Ok(raw) => {
                let parsed = self.verifier.parse(&raw);
                if let ParsedAuditorOutput::Invalid { reason, raw } = &parsed {
                    warn!(
                        key = %request.run.key,
                        %reason,
                        raw_len = raw.len(),
                        "auditor reply rejected, treating as HIGH risk"
                    );
                }
                AuditorSignal {
                    output: parsed.into_output(),
                    placeholder: false,
                    model: auditor.model().to_string(),
                }
            }
            Err(e) => {
                warn!(key = %request.run.key, error = %e, "auditor call failed, using placeholder review");
                AuditorSignal::placeholder(&e.to_string())
            }
        }
    }

    /// Hash `artifact_bytes` and write the JSON and text proof records.
    #[allow(clippy::too_many_arguments)]
    fn write_proof(
        &self,
        run: &RunContext,
        artifact_name: &str,
        artifact_bytes: &[u8],
        model: &str,
        input_hash: &str,
        timestamp: DateTime<Utc>,
        names: ProofNames,
    ) -> GateResult<ProofOfOrigin> {
        let proof = ProofOfOrigin {
            source: PROOF_SOURCE.to_string(),
            artifact: artifact_name.to_string(),
            workflow_run_id: run.run_id.clone(),
            run_attempt: run.run_attempt,
            actor: run.actor.clone(),
            repo: run.repo.clone(),
            sha: run.sha.clone(),
            pr_number: run.key.pr_number(),
            week_id: run.key.week_id().map(str::to_string),
            timestamp_utc: timestamp,
            model: model.to_string(),
            input_hash_sha256: input_hash.to_string(),
            output_hash_sha256: sha256_hex(artifact_bytes),
        };

        let json = canonical_json(&proof).map_err(|e| GateError::write(&names.json, e))?;
        self.store.write_artifact(&names.json, &json)?;
        self.store.write_artifact(&names.text, proof.to_text().as_bytes())?;
        debug!(artifact = %artifact_name, proof = %names.text, "proof of origin written");

        Ok(proof)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use auditgate_contracts::{
        artifact::RiskLevel,
        auditor::{AuditorOutput, AuditorSignal, ParsedAuditorOutput},
        digest::sha256_hex,
        error::{GateError, GateResult},
        event::{kinds, EventLogEntry},
        layout,
        policy::{PolicyDecision, Reason},
        proof::ProofRecord,
        request::{ArtifactKey, AuditRequest, CiStatus, CiStatuses, GatheredContext, RunContext},
    };

    use crate::traits::{Auditor, ContextSource, EventStore, OutputVerifier, PolicyEngine};

    use super::{exit, exit_code_for, ProtocolClient};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// Records every write, and the order writes and auditor calls happened in.
    #[derive(Clone, Default)]
    struct MockStore {
        files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
        events: Arc<Mutex<Vec<EventLogEntry>>>,
        journal: Arc<Mutex<Vec<String>>>,
        fail_on: Option<String>,
    }

    impl EventStore for MockStore {
        fn write_artifact(&self, name: &str, bytes: &[u8]) -> GateResult<()> {
            if self.fail_on.as_deref() == Some(name) {
                return Err(GateError::write(name, "disk full"));
            }
            self.journal.lock().unwrap().push(format!("write:{name}"));
            self.files.lock().unwrap().insert(name.to_string(), bytes.to_vec());
            Ok(())
        }

        fn read_artifact(&self, name: &str) -> GateResult<Option<Vec<u8>>> {
            Ok(self.files.lock().unwrap().get(name).cloned())
        }

        fn remove_artifact(&self, name: &str) -> GateResult<bool> {
            Ok(self.files.lock().unwrap().remove(name).is_some())
        }

        fn list_artifacts(&self) -> GateResult<Vec<String>> {
            Ok(self.files.lock().unwrap().keys().cloned().collect())
        }

        fn append_event(&self, entry: &EventLogEntry) -> GateResult<()> {
            self.journal.lock().unwrap().push(format!("event:{}", entry.kind));
            self.events.lock().unwrap().push(entry.clone());
            Ok(())
        }

        fn read_events(&self) -> GateResult<Vec<EventLogEntry>> {
            Ok(self.events.lock().unwrap().clone())
        }
    }

    struct FixedContext {
        diff: String,
        statuses: CiStatuses,
    }

    impl ContextSource for FixedContext {
        fn gather(&self, _key: &ArtifactKey) -> GateResult<GatheredContext> {
            Ok(GatheredContext {
                diff: self.diff.clone(),
                statuses: self.statuses.clone(),
                doc_hash: sha256_hex(b"governance"),
            })
        }
    }

    enum Reply {
        Text(&'static str),
        Timeout,
    }

    struct MockAuditor {
        reply: Reply,
        journal: Arc<Mutex<Vec<String>>>,
        seen_pending: Arc<Mutex<Vec<String>>>,
    }

    impl Auditor for MockAuditor {
        fn model(&self) -> &str {
            "mock-model"
        }

        fn review(&self, request: &AuditRequest) -> GateResult<String> {
            self.journal.lock().unwrap().push("auditor".to_string());
            *self.seen_pending.lock().unwrap() = request.pending_events.clone();
            match self.reply {
                Reply::Text(t) => Ok(t.to_string()),
                Reply::Timeout => Err(GateError::AuditorTimeout { after_secs: 15 }),
            }
        }
    }

    /// Strict serde parse, standing in for the schema verifier.
    struct SerdeVerifier;

    impl OutputVerifier for SerdeVerifier {
        fn parse(&self, raw: &str) -> ParsedAuditorOutput {
            match serde_json::from_str::<AuditorOutput>(raw) {
                Ok(o) => ParsedAuditorOutput::Valid(o),
                Err(e) => ParsedAuditorOutput::Invalid {
                    raw: raw.to_string(),
                    reason: e.to_string(),
                },
            }
        }
    }

    /// Minimal rule set: statuses, doc violations, `stripe` keyword, risk.
    struct MiniPolicy;

    impl PolicyEngine for MiniPolicy {
        fn decide(&self, statuses: &CiStatuses, diff: &str, signal: &AuditorSignal) -> PolicyDecision {
            let mut reasons = vec![];
            if !statuses.all_green() {
                reasons.push(Reason::StatusesNotGreen);
            }
            if !signal.output.doc_mestre_violations.is_empty() {
                reasons.push(Reason::DocumentoMestreViolations);
            }
            if diff.to_lowercase().contains("stripe") {
                reasons.push(Reason::SensitiveAreaChange);
            }
            match signal.output.risk_level {
                RiskLevel::High => reasons.push(Reason::HighRisk),
                RiskLevel::Medium => reasons.push(Reason::MediumRisk),
                RiskLevel::Low => {}
            }
            PolicyDecision::from_reasons(reasons)
        }
    }

    const LOW: &str = r#"{"risk_level":"LOW","findings":[],"doc_mestre_violations":[]}"#;

    fn run(pr: u64) -> RunContext {
        RunContext {
            key: ArtifactKey::Pr(pr),
            sha: "4f1c2a".to_string(),
            actor: "octocat".to_string(),
            repo: "acme/marketplace".to_string(),
            run_id: "9912".to_string(),
            run_attempt: 1,
        }
    }

    struct Harness {
        store: MockStore,
        journal: Arc<Mutex<Vec<String>>>,
        seen_pending: Arc<Mutex<Vec<String>>>,
    }

    fn client(diff: &str, statuses: CiStatuses, reply: Option<Reply>) -> (ProtocolClient, Harness) {
        client_with_store(MockStore::default(), diff, statuses, reply)
    }

    fn client_with_store(
        store: MockStore,
        diff: &str,
        statuses: CiStatuses,
        reply: Option<Reply>,
    ) -> (ProtocolClient, Harness) {
        let journal = store.journal.clone();
        let seen_pending = Arc::new(Mutex::new(vec![]));
        let auditor = reply.map(|reply| {
            Box::new(MockAuditor {
                reply,
                journal: journal.clone(),
                seen_pending: seen_pending.clone(),
            }) as Box<dyn Auditor>
        });
        let client = ProtocolClient::new(
            Box::new(store.clone()),
            Box::new(FixedContext {
                diff: diff.to_string(),
                statuses,
            }),
            auditor,
            Box::new(SerdeVerifier),
            Box::new(MiniPolicy),
        );
        (
            client,
            Harness {
                store,
                journal,
                seen_pending,
            },
        )
    }

    fn red_tests() -> CiStatuses {
        CiStatuses {
            tests: CiStatus::new("fail"),
            ..CiStatuses::all_pass()
        }
    }

    // ── Verdict and exit code ────────────────────────────────────────────────

    #[test]
    fn green_low_risk_run_is_approved_with_exit_zero() {
        let (client, _) = client("+ fn render() {}", CiStatuses::all_pass(), Some(Reply::Text(LOW)));
        let outcome = client.run_audit(&run(1)).unwrap();

        assert_eq!(outcome.result.verdict.as_str(), "APPROVED");
        assert!(outcome.result.reasons.is_empty());
        assert_eq!(outcome.exit_code(), exit::APPROVED);
        assert!(!outcome.result.placeholder);
        assert_eq!(outcome.result_proof.model, "mock-model");
    }

    #[test]
    fn sensitive_diff_is_rejected_even_at_low_risk() {
        let (client, _) = client(
            "+ const stripe = require('stripe');",
            CiStatuses::all_pass(),
            Some(Reply::Text(LOW)),
        );
        let outcome = client.run_audit(&run(2)).unwrap();

        assert_eq!(outcome.result.verdict.as_str(), "REJECTED");
        assert!(outcome.result.reasons.contains(&Reason::SensitiveAreaChange));
        assert_eq!(outcome.exit_code(), exit::NOT_APPROVED);
    }

    #[test]
    fn invalid_reply_synthesizes_high_risk() {
        let (client, _) = client("+ x", CiStatuses::all_pass(), Some(Reply::Text("LGTM, ship it")));
        let outcome = client.run_audit(&run(3)).unwrap();

        assert_eq!(outcome.result.risk_level, RiskLevel::High);
        assert_eq!(outcome.result.findings, vec!["Invalid JSON"]);
        assert_eq!(outcome.result.doc_mestre_violations, vec!["invalid_response"]);
        assert_eq!(outcome.result.verdict.as_str(), "REJECTED");
    }

    #[test]
    fn reply_with_extra_verdict_field_cannot_approve() {
        let (client, _) = client(
            "+ x",
            red_tests(),
            Some(Reply::Text(
                r#"{"risk_level":"LOW","findings":[],"doc_mestre_violations":[],"verdict":"APPROVED"}"#,
            )),
        );
        let outcome = client.run_audit(&run(4)).unwrap();
        assert_ne!(outcome.result.verdict.as_str(), "APPROVED");
    }

    #[test]
    fn missing_credential_with_red_status_never_approves() {
        let (client, _) = client("+ x", red_tests(), None);
        let outcome = client.run_audit(&run(5)).unwrap();

        assert!(outcome.result.placeholder);
        assert_eq!(outcome.result_proof.model, "placeholder");
        assert!(outcome.result.reasons.contains(&Reason::StatusesNotGreen));
        assert_eq!(outcome.exit_code(), exit::NOT_APPROVED);
    }

    #[test]
    fn missing_credential_on_green_path_approves() {
        let (client, _) = client("+ x", CiStatuses::all_pass(), None);
        let outcome = client.run_audit(&run(6)).unwrap();
        assert!(outcome.result.placeholder);
        assert_eq!(outcome.exit_code(), exit::APPROVED);
    }

    #[test]
    fn auditor_timeout_falls_back_to_placeholder() {
        let (client, _) = client("+ x", CiStatuses::all_pass(), Some(Reply::Timeout));
        let outcome = client.run_audit(&run(7)).unwrap();
        assert!(outcome.result.placeholder);
        assert!(outcome.result.findings[0].contains("timed out"));
    }

    // ── Ordering and provenance ──────────────────────────────────────────────

    #[test]
    fn ack_is_durable_before_auditor_and_result_before_its_proof() {
        let (client, h) = client("+ x", CiStatuses::all_pass(), Some(Reply::Text(LOW)));
        client.run_audit(&run(8)).unwrap();

        let journal = h.journal.lock().unwrap().clone();
        let pos = |needle: &str| journal.iter().position(|j| j == needle).unwrap();

        assert!(pos("event:REQUEST") < pos("write:audit-ack-PR_8.json"));
        assert!(pos("write:audit-ack-PR_8.json") < pos("write:proof-of-origin-ack-PR_8.txt"));
        assert!(pos("write:proof-of-origin-ack-PR_8.txt") < pos("auditor"));
        assert!(pos("auditor") < pos("write:audit-result-PR_8.json"));
        assert!(pos("write:audit-result-PR_8.json") < pos("write:proof-of-origin-PR_8.json"));
        assert!(pos("write:proof-of-origin-PR_8.txt") < pos("event:RESULT"));
    }

    #[test]
    fn proofs_hash_the_exact_artifact_bytes() {
        let (client, h) = client("+ x", CiStatuses::all_pass(), Some(Reply::Text(LOW)));
        let outcome = client.run_audit(&run(9)).unwrap();
        let key = ArtifactKey::Pr(9);

        for (artifact, proof_text) in [
            (layout::result_file(&key), layout::result_proof_text(&key)),
            (layout::ack_file(&key), layout::ack_proof_text(&key)),
        ] {
            let bytes = h.store.read_artifact(&artifact).unwrap().unwrap();
            let text = h.store.read_artifact(&proof_text).unwrap().unwrap();
            let record = ProofRecord::parse(std::str::from_utf8(&text).unwrap());
            assert_eq!(record.hash.as_deref().unwrap(), sha256_hex(&bytes), "{artifact}");
            assert_eq!(record.get("workflow_run_id"), Some("9912"));
            assert_eq!(record.get("pr_number"), Some("9"));
        }
        assert!(h.store.read_artifact(&layout::result_proof_json(&key)).unwrap().is_some());
        assert_eq!(
            outcome.ack.context_summary_hash,
            outcome.result_proof.input_hash_sha256
        );
    }

    #[test]
    fn timestamps_never_go_backwards() {
        let (client, h) = client("+ x", CiStatuses::all_pass(), Some(Reply::Text(LOW)));
        let outcome = client.run_audit(&run(10)).unwrap();

        assert!(outcome.result.emitted_at_utc >= outcome.ack.received_at_utc);
        let events = h.store.read_events().unwrap();
        let kinds_seen: Vec<&str> = events.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds_seen, vec![kinds::REQUEST, kinds::ACK, kinds::RESULT]);
        assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert!(events[0].timestamp <= outcome.ack.received_at_utc);
    }

    #[test]
    fn failed_result_write_is_an_error_and_leaves_the_ack() {
        let store = MockStore {
            fail_on: Some("audit-result-PR_11.json".to_string()),
            ..MockStore::default()
        };
        let (client, h) =
            client_with_store(store, "+ x", CiStatuses::all_pass(), Some(Reply::Text(LOW)));

        let outcome = client.run_audit(&run(11));
        assert!(matches!(outcome, Err(GateError::ArtifactWrite { .. })));
        assert_eq!(exit_code_for(&outcome), exit::INTERNAL_ERROR);
        assert!(h.store.read_artifact("audit-ack-PR_11.json").unwrap().is_some());
        assert!(h.store.read_artifact("proof-of-origin-PR_11.txt").unwrap().is_none());
    }

    #[test]
    fn incomplete_run_context_fails_before_any_io() {
        let (client, h) = client("+ x", CiStatuses::all_pass(), Some(Reply::Text(LOW)));
        let mut bad = run(12);
        bad.sha = "  ".to_string();

        match client.run_audit(&bad) {
            Err(GateError::MissingArgument { name }) => assert_eq!(name, "sha"),
            other => panic!("expected MissingArgument, got {other:?}"),
        }
        assert!(h.journal.lock().unwrap().is_empty());
    }

    #[test]
    fn week_id_with_path_separator_fails_before_any_io() {
        let (client, h) = client("+ x", CiStatuses::all_pass(), Some(Reply::Text(LOW)));
        for week in ["../2026-W42", "2026\\W42"] {
            let mut bad = run(0);
            bad.key = ArtifactKey::Week(week.to_string());
            assert!(
                matches!(client.run_audit(&bad), Err(GateError::ConfigError { .. })),
                "{week}"
            );
        }
        assert!(h.journal.lock().unwrap().is_empty());
        assert!(h.store.read_events().unwrap().is_empty());
    }

    #[test]
    fn request_lists_other_open_tasks_as_pending() {
        let store = MockStore::default();
        store
            .append_event(&EventLogEntry::new(kinds::REQUEST, Some("PR_77".into()), chrono::Utc::now()))
            .unwrap();
        let (client, h) =
            client_with_store(store, "+ x", CiStatuses::all_pass(), Some(Reply::Text(LOW)));

        client.run_audit(&run(13)).unwrap();
        assert_eq!(*h.seen_pending.lock().unwrap(), vec!["PR_77".to_string()]);
    }

    #[test]
    fn weekly_key_writes_week_named_artifacts() {
        let (client, h) = client("+ x", CiStatuses::all_pass(), Some(Reply::Text(LOW)));
        let mut weekly = run(0);
        weekly.key = ArtifactKey::Week("2026-W42".to_string());

        let outcome = client.run_audit(&weekly).unwrap();
        assert_eq!(outcome.result_proof.week_id.as_deref(), Some("2026-W42"));
        assert!(outcome.result_proof.pr_number.is_none());
        assert!(h
            .store
            .read_artifact("audit-result-WEEK_2026-W42.json")
            .unwrap()
            .is_some());
    }
}
