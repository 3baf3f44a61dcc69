//! Error types for the audit pipeline.
//!
//! Every fallible operation in the workspace returns `GateResult<T>`.
//! Variants carry enough context for a CI log line to be actionable on its own.

use thiserror::Error;

/// The unified error type for the audit pipeline.
#[derive(Debug, Error)]
pub enum GateError {
    /// An artifact could not be persisted to the event store.
    ///
    /// Fatal for the ProtocolClient: a run that cannot leave evidence
    /// must not report a verdict.
    #[error("artifact write failed for '{artifact}': {reason}")]
    ArtifactWrite { artifact: String, reason: String },

    /// An artifact or the event log could not be read back.
    #[error("artifact read failed for '{artifact}': {reason}")]
    ArtifactRead { artifact: String, reason: String },

    /// A configuration file is missing, unreadable, or malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A required run argument was absent or empty.
    #[error("missing required argument '{name}'")]
    MissingArgument { name: String },

    /// The external auditor could not be reached or answered with an error status.
    #[error("auditor transport error: {reason}")]
    AuditorTransport { reason: String },

    /// The external auditor did not answer before the configured deadline.
    #[error("auditor timed out after {after_secs}s")]
    AuditorTimeout { after_secs: u64 },

    /// A JSON Schema document could not be compiled or applied.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// A protocol artifact has missing or mismatched provenance.
    #[error("provenance violation in '{artifact}': {reason}")]
    Provenance { artifact: String, reason: String },

    /// An external command could not be spawned.
    #[error("command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// The audit context (diff, statuses, governance document) could not be assembled.
    #[error("context assembly failed: {reason}")]
    Context { reason: String },
}

impl GateError {
    /// Build an `ArtifactWrite` error from any displayable cause.
    pub fn write(artifact: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::ArtifactWrite {
            artifact: artifact.into(),
            reason: cause.to_string(),
        }
    }

    /// Build an `ArtifactRead` error from any displayable cause.
    pub fn read(artifact: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::ArtifactRead {
            artifact: artifact.into(),
            reason: cause.to_string(),
        }
    }

    /// True for the auditor failures the ProtocolClient recovers from with a
    /// placeholder reply.
    pub fn is_auditor_unavailable(&self) -> bool {
        matches!(self, Self::AuditorTransport { .. } | Self::AuditorTimeout { .. })
    }
}

/// Convenience alias used throughout the auditgate crates.
pub type GateResult<T> = Result<T, GateError>;
