//! # auditgate-verify
//!
//! Verification for the auditgate PR audit pipeline.
//!
//! This crate provides two independent checks:
//!
//! 1. [`SchemaOutputVerifier`] implements
//!    [`auditgate_core::traits::OutputVerifier`]. It turns raw auditor text
//!    into a `ParsedAuditorOutput` using JSON Schema plus a typed decode.
//! 2. [`ProofGuardrail`] scans an event store and fails when any ACK or
//!    RESULT artifact lacks a proof record with a matching `Hash:`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use auditgate_verify::ProofGuardrail;
//!
//! let report = ProofGuardrail::new(&store).audit()?;
//! std::process::exit(report.exit_code());
//! ```

pub mod guardrail;
pub mod schema;

pub use guardrail::{GuardrailReport, ProofGuardrail, Violation, ViolationKind};
pub use schema::SchemaOutputVerifier;

// ── Tests ─────────────────────────────────────────────────────────────────────
