//! Workspace configuration loaded from `auditgate.toml`.
//!
//! Every section and field has a default, so an absent file is a valid
//! configuration. A present but malformed file is a `ConfigError`.
//!
//! ```toml
//! [store]
//! dir = ".audit"
//!
//! [auditor]
//! endpoint = "https://api.openai.com/v1/chat/completions"
//! model = "gpt-4o-mini"
//! timeout_secs = 15
//! api_key_env = "AUDITOR_API_KEY"
//!
//! [policy]
//! trunk_branch = "main"
//! extra_sensitive_keywords = ["billing", "invoice"]
//!
//! [monitor]
//! ack_timeout_secs = 300
//! result_timeout_secs = 1800
//!
//! [gates]
//! lint = ["npm", "run", "lint"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "auditgate.toml";

/// Payment, auth, webhook and security-rule terms.
pub const DEFAULT_SENSITIVE_KEYWORDS: &[&str] = &[
    "stripe",
    "payment",
    "checkout",
    "payout",
    "webhook",
    "auth",
    "password",
    "jwt",
    "firestore.rules",
    "storage.rules",
    "security",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub store: StoreSettings,
    pub auditor: AuditorSettings,
    pub policy: PolicySettings,
    pub governance: GovernanceSettings,
    pub statuses: StatusSettings,
    pub monitor: MonitorSettings,
    pub gates: GateCommands,
}

impl GateConfig {
    pub fn from_toml_str(s: &str) -> GateResult<Self> {
        toml::from_str(s).map_err(|e| GateError::ConfigError {
            reason: format!("failed to parse config TOML: {e}"),
        })
    }

    pub fn from_file(path: &Path) -> GateResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GateError::ConfigError {
            reason: format!("failed to read config file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load `explicit` if given (it must exist), else `auditgate.toml` in the
    /// working directory if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> GateResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub dir: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".audit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditorSettings {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Name of the env var holding the credential. Unset means placeholder mode.
    pub api_key_env: String,
}

impl Default for AuditorSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 15,
            api_key_env: "AUDITOR_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Branch the PR diff is taken against.
    pub trunk_branch: String,
    /// Keywords added to `DEFAULT_SENSITIVE_KEYWORDS`. The built-in set
    /// itself is not configurable.
    pub extra_sensitive_keywords: Vec<String>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            trunk_branch: "main".to_string(),
            extra_sensitive_keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceSettings {
    /// The governance document whose excerpt is fingerprinted into `docHash`.
    pub document: PathBuf,
    /// How many leading bytes of the document make up the excerpt.
    pub excerpt_bytes: usize,
}

impl Default for GovernanceSettings {
    fn default() -> Self {
        Self {
            document: PathBuf::from("DOCUMENTO_MESTRE.md"),
            excerpt_bytes: 4000,
        }
    }
}

/// Names of the env vars the CI pipeline injects status strings through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSettings {
    pub tests_env: String,
    pub lint_env: String,
    pub build_env: String,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            tests_env: "AUDIT_TESTS_STATUS".to_string(),
            lint_env: "AUDIT_LINT_STATUS".to_string(),
            build_env: "AUDIT_BUILD_STATUS".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub ack_timeout_secs: i64,
    pub result_timeout_secs: i64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            ack_timeout_secs: 5 * 60,
            result_timeout_secs: 30 * 60,
        }
    }
}

/// Operator gate commands, each an argv vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateCommands {
    pub lint: Vec<String>,
    pub typecheck: Vec<String>,
    pub build: Vec<String>,
    pub test_frontend: Vec<String>,
    pub test_backend: Vec<String>,
    pub security: Vec<String>,
    pub format: Vec<String>,
    pub lint_fix: Vec<String>,
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

impl Default for GateCommands {
    fn default() -> Self {
        Self {
            lint: argv(&["npm", "run", "lint"]),
            typecheck: argv(&["npm", "run", "typecheck"]),
            build: argv(&["npm", "run", "build"]),
            test_frontend: argv(&["npm", "test"]),
            test_backend: argv(&["npm", "--prefix", "functions", "test"]),
            security: argv(&["npm", "audit", "--audit-level=high"]),
            format: argv(&["npx", "prettier", "--write", "."]),
            lint_fix: argv(&["npm", "run", "lint", "--", "--fix"]),
        }
    }
}
