//! Read-only operator views: `protocolo dashboard` and `protocolo pr-status`.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

use auditgate_contracts::{
    config::GateConfig,
    error::{GateError, GateResult},
    event::ExecutorState,
    layout::EXECUTOR_STATE,
};

const SCRIPTS: &[&str] = &["lint", "typecheck", "build", "test", "format", "security"];

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

fn current_branch(root: &Path) -> String {
    Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(root)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Which of the usual npm scripts `package.json` defines.
pub fn script_presence(root: &Path) -> Vec<(&'static str, bool)> {
    let scripts = std::fs::read_to_string(root.join("package.json"))
        .ok()
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .and_then(|pkg| pkg.get("scripts").cloned())
        .unwrap_or(Value::Null);
    SCRIPTS
        .iter()
        .map(|name| (*name, scripts.get(*name).is_some()))
        .collect()
}

/// Dashboard lines as `(label, value)` pairs.
pub fn dashboard(
    config: &GateConfig,
    root: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<(String, String)> {
    let mut lines = vec![
        ("directory".to_string(), root.display().to_string()),
        ("branch".to_string(), current_branch(root)),
        (
            "auditor credential".to_string(),
            yes_no(lookup(&config.auditor.api_key_env).is_some_and(|v| !v.trim().is_empty()))
                .to_string(),
        ),
        ("auditor model".to_string(), config.auditor.model.clone()),
        ("event store".to_string(), config.store.dir.display().to_string()),
    ];

    let state = std::fs::read(config.store.dir.join(EXECUTOR_STATE))
        .ok()
        .and_then(|b| serde_json::from_slice::<ExecutorState>(&b).ok());
    lines.push((
        "executor state".to_string(),
        match state {
            Some(s) => format!("{}: {}", s.status.as_str(), s.message),
            None => "never monitored".to_string(),
        },
    ));

    for (name, present) in script_presence(root) {
        lines.push((format!("script '{name}'"), yes_no(present).to_string()));
    }
    lines
}

/// List open PRs through the GitHub CLI. Without `gh`, print a hint and
/// succeed.
pub fn pr_status() -> GateResult<i32> {
    let available = Command::new("gh")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !available {
        println!("GitHub CLI (gh) not found; install it and run `gh auth login` to list open PRs.");
        return Ok(0);
    }
    let status = Command::new("gh")
        .args(["pr", "list", "--state", "open"])
        .status()
        .map_err(|e| GateError::CommandFailed {
            command: "gh pr list".to_string(),
            reason: e.to_string(),
        })?;
    Ok(status.code().unwrap_or(1))
}
