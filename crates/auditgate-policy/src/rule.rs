//! Sensitive-area keyword rules.
//!
//! A diff that mentions any sensitive keyword is a sensitive-area change and
//! can never be approved automatically, whatever the auditor says. Matching
//! is a case-insensitive substring test over the whole unified diff, so
//! keywords hit file paths and code alike.
//!
//! The built-in `DEFAULT_SENSITIVE_KEYWORDS` are always active. Configuration
//! can add keywords but never remove one.

use serde::Deserialize;

use auditgate_contracts::config::DEFAULT_SENSITIVE_KEYWORDS;

/// The active keyword set: the built-in keywords followed by any extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveAreas {
    keywords: Vec<String>,
}

/// On-disk shape of a standalone keyword file.
///
/// ```toml
/// extra_sensitive_keywords = ["billing", "invoice"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub(crate) struct KeywordFile {
    #[serde(default)]
    pub extra_sensitive_keywords: Vec<String>,
}

impl Default for SensitiveAreas {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl SensitiveAreas {
    /// The built-in keywords extended with `extra`.
    ///
    /// Blank extras and case-insensitive duplicates are dropped.
    pub fn new(extra: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut keywords: Vec<String> =
            DEFAULT_SENSITIVE_KEYWORDS.iter().map(|k| k.to_string()).collect();
        for keyword in extra {
            let keyword = keyword.into().trim().to_string();
            if keyword.is_empty()
                || keywords.iter().any(|k| k.eq_ignore_ascii_case(&keyword))
            {
                continue;
            }
            keywords.push(keyword);
        }
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Every keyword that occurs in `diff`, in set order.
    pub fn matches<'a>(&'a self, diff: &str) -> Vec<&'a str> {
        let haystack = diff.to_lowercase();
        self.keywords
            .iter()
            .map(String::as_str)
            .filter(|k| haystack.contains(&k.to_lowercase()))
            .collect()
    }
}
