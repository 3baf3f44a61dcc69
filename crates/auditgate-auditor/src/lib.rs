//! # auditgate-auditor
//!
//! The external auditor client for the auditgate PR audit pipeline.
//!
//! [`HttpAuditor`] implements [`auditgate_core::traits::Auditor`] over a
//! blocking `reqwest` client with a hard timeout. The credential is held as a
//! `secrecy::SecretString`. Without a credential no auditor is built at all,
//! and the protocol client falls back to its placeholder review.
//!
//! The auditor is an untrusted signal source: this crate returns the reply
//! text exactly as received and leaves all parsing to the verifier.

pub mod http;
pub mod prompt;

pub use http::HttpAuditor;

// ── Tests ─────────────────────────────────────────────────────────────────────
