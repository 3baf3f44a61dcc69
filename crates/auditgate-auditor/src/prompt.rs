//! Request body construction for the chat-completions auditor endpoint.
//!
//! The reply schema travels with the request as a strict `json_schema`
//! response format. The body is built here, separately from transport, so it
//! can be inspected without a network.

use serde::Deserialize;
use serde_json::{json, Value};

use auditgate_contracts::{auditor::output_schema, request::AuditRequest};

/// Diffs longer than this are cut, with a marker, before being sent.
pub const MAX_DIFF_BYTES: usize = 60_000;

const SYSTEM_PROMPT: &str = "You are a code-review auditor for a production repository. \
Assess the risk of the change described below against the governance document whose \
hash is given. Reply only with JSON matching the provided schema: risk_level is LOW, \
MEDIUM or HIGH; findings lists concrete problems; doc_mestre_violations lists breaches \
of the governance document. You do not approve or reject changes.";

/// Cut `diff` to at most `max` bytes on a char boundary.
pub fn truncate_diff(diff: &str, max: usize) -> (&str, bool) {
    if diff.len() <= max {
        return (diff, false);
    }
    let mut end = max;
    while !diff.is_char_boundary(end) {
        end -= 1;
    }
    (&diff[..end], true)
}

/// The user message: run facts first, diff last.
pub fn user_prompt(request: &AuditRequest) -> String {
    let (diff, truncated) = truncate_diff(&request.diff, MAX_DIFF_BYTES);
    let pending = if request.pending_events.is_empty() {
        "none".to_string()
    } else {
        request.pending_events.join(", ")
    };

    let mut prompt = format!(
        "Audit target: {key}\nRepository: {repo}\nCommit: {sha}\n\
         CI statuses: tests={tests} lint={lint} build={build}\n\
         Governance document hash: {doc}\n\
         Other audits still pending: {pending}\n\n\
         Unified diff:\n{diff}",
        key = request.run.key,
        repo = request.run.repo,
        sha = request.run.sha,
        tests = request.statuses.tests.0,
        lint = request.statuses.lint.0,
        build = request.statuses.build.0,
        doc = request.doc_hash,
    );
    if truncated {
        prompt.push_str(&format!(
            "\n[diff truncated to {MAX_DIFF_BYTES} of {} bytes]",
            request.diff.len()
        ));
    }
    prompt
}

pub fn request_body(model: &str, request: &AuditRequest) -> Value {
    json!({
        "model": model,
        "temperature": 0,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": user_prompt(request) }
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "audit_review",
                "strict": true,
                "schema": output_schema()
            }
        }
    })
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// The first choice's message content, or the whole body when the envelope
/// has an unexpected shape. The verifier then rejects it as invalid.
pub fn reply_text(body: &str) -> String {
    serde_json::from_str::<Completion>(body)
        .ok()
        .and_then(|c| c.choices.into_iter().next())
        .and_then(|c| c.message.content)
        .unwrap_or_else(|| body.to_string())
}
