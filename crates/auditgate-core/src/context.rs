//! Context gathering from the local checkout and the CI environment.
//!
//! The diff comes from `git`, the statuses from env vars the pipeline sets,
//! and the governance fingerprint from the leading bytes of a document in the
//! repository. None of these are measured by running tests locally.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

use auditgate_contracts::{
    config::GateConfig,
    digest::sha256_hex,
    error::{GateError, GateResult},
    request::{ArtifactKey, CiStatus, CiStatuses, GatheredContext},
};

use crate::traits::ContextSource;

/// `docHash` value when the governance document does not exist.
pub const DOC_ABSENT: &str = "absent";

/// Gathers context from a git checkout and the process environment.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    repo_root: PathBuf,
    trunk_branch: String,
    document: PathBuf,
    excerpt_bytes: usize,
    status_envs: [String; 3],
}

impl WorkspaceContext {
    pub fn from_config(repo_root: impl Into<PathBuf>, config: &GateConfig) -> Self {
        Self {
            repo_root: repo_root.into(),
            trunk_branch: config.policy.trunk_branch.clone(),
            document: config.governance.document.clone(),
            excerpt_bytes: config.governance.excerpt_bytes,
            status_envs: [
                config.statuses.tests_env.clone(),
                config.statuses.lint_env.clone(),
                config.statuses.build_env.clone(),
            ],
        }
    }

    /// Read the three status strings through `lookup`.
    ///
    /// An unset variable becomes `unknown`, which is never green.
    pub fn statuses_from(&self, lookup: impl Fn(&str) -> Option<String>) -> CiStatuses {
        let read = |name: &str| match lookup(name) {
            Some(v) if !v.trim().is_empty() => CiStatus::new(v.trim()),
            _ => {
                warn!(env = %name, "CI status not injected, treating as unknown");
                CiStatus::unknown()
            }
        };
        CiStatuses {
            tests: read(&self.status_envs[0]),
            lint: read(&self.status_envs[1]),
            build: read(&self.status_envs[2]),
        }
    }

    /// SHA-256 of the first `excerpt_bytes` of the governance document.
    pub fn doc_hash(&self) -> GateResult<String> {
        let path = self.repo_root.join(&self.document);
        match std::fs::read(&path) {
            Ok(bytes) => {
                let end = bytes.len().min(self.excerpt_bytes);
                Ok(sha256_hex(&bytes[..end]))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(document = %path.display(), "governance document not found");
                Ok(DOC_ABSENT.to_string())
            }
            Err(e) => Err(GateError::Context {
                reason: format!("cannot read governance document '{}': {e}", path.display()),
            }),
        }
    }

    fn git(&self, args: &[&str]) -> GateResult<String> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .map_err(|e| GateError::CommandFailed {
                command: "git".to_string(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(GateError::Context {
                reason: format!(
                    "git {} exited with {}: {}",
                    args.join(" "),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Unified diff for `key`.
    ///
    /// PRs diff the merge base of the trunk against `HEAD`. The weekly system
    /// audit takes the last seven days of trunk history as a patch series.
    /// Both prefer the remote-tracking trunk and fall back to the local one.
    pub fn diff(&self, key: &ArtifactKey) -> GateResult<String> {
        let remote = format!("origin/{}", self.trunk_branch);
        let candidates = [remote.as_str(), self.trunk_branch.as_str()];

        let mut last_err = None;
        for base in candidates {
            let attempt = match key {
                ArtifactKey::Pr(_) => {
                    let range = format!("{base}...HEAD");
                    self.git(&["diff", "--no-color", &range])
                }
                ArtifactKey::Week(_) => {
                    self.git(&["log", "--since=7.days", "--no-merges", "-p", "--no-color", base])
                }
            };
            match attempt {
                Ok(diff) => return Ok(diff),
                Err(e) => {
                    debug!(base, error = %e, "diff base unavailable");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| GateError::Context {
            reason: "no diff base available".to_string(),
        }))
    }
}

impl ContextSource for WorkspaceContext {
    fn gather(&self, key: &ArtifactKey) -> GateResult<GatheredContext> {
        let diff = self.diff(key)?;
        let statuses = self.statuses_from(|name| std::env::var(name).ok());
        let doc_hash = self.doc_hash()?;
        debug!(
            %key,
            diff_bytes = diff.len(),
            statuses_green = statuses.all_green(),
            "context gathered"
        );
        Ok(GatheredContext {
            diff,
            statuses,
            doc_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use auditgate_contracts::config::GateConfig;

    use super::*;

    fn context_in(root: &std::path::Path) -> WorkspaceContext {
        let mut config = GateConfig::default();
        config.governance.excerpt_bytes = 8;
        WorkspaceContext::from_config(root, &config)
    }

    #[test]
    fn statuses_read_from_lookup_with_unknown_default() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(dir.path());
        let env: HashMap<&str, &str> =
            [("AUDIT_TESTS_STATUS", "pass"), ("AUDIT_LINT_STATUS", " fail ")].into();

        let statuses = ctx.statuses_from(|name| env.get(name).map(|v| v.to_string()));

        assert!(statuses.tests.is_pass());
        assert_eq!(statuses.lint, CiStatus::new("fail"));
        assert_eq!(statuses.build, CiStatus::unknown());
    }

    #[test]
    fn doc_hash_covers_only_the_excerpt() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(dir.path());
        std::fs::write(dir.path().join("DOCUMENTO_MESTRE.md"), "12345678-tail-one").unwrap();
        let first = ctx.doc_hash().unwrap();

        std::fs::write(dir.path().join("DOCUMENTO_MESTRE.md"), "12345678-tail-two").unwrap();
        assert_eq!(ctx.doc_hash().unwrap(), first, "bytes past the excerpt must not matter");
        assert_eq!(first, sha256_hex(b"12345678"));

        std::fs::write(dir.path().join("DOCUMENTO_MESTRE.md"), "changed!-tail").unwrap();
        assert_ne!(ctx.doc_hash().unwrap(), first);
    }

    #[test]
    fn missing_document_hashes_to_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(context_in(dir.path()).doc_hash().unwrap(), DOC_ABSENT);
    }
}
