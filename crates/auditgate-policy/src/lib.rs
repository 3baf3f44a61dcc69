//! # auditgate-policy
//!
//! The deterministic verdict engine for the auditgate PR audit pipeline.
//!
//! ## Overview
//!
//! This crate provides [`GatePolicyEngine`], which implements the
//! [`PolicyEngine`](auditgate_core::traits::PolicyEngine) trait. It is a pure
//! function of the CI statuses, the diff, and the auditor signal: no clock, no
//! I/O, no hidden state. The only configurable input is a list of extra
//! sensitive-area keywords.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use auditgate_policy::GatePolicyEngine;
//!
//! let engine = GatePolicyEngine::from_settings(&config.policy);
//! // Pass `engine` to `auditgate_core::ProtocolClient::new(...)`.
//! ```

pub mod engine;
pub mod rule;

pub use engine::GatePolicyEngine;
pub use rule::SensitiveAreas;

// ── Tests ─────────────────────────────────────────────────────────────────────
