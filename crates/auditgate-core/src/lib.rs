//! # auditgate-core
//!
//! The protocol runtime for the auditgate PR audit pipeline.
//!
//! This crate provides:
//! - The five trust-boundary traits (`Auditor`, `OutputVerifier`,
//!   `PolicyEngine`, `EventStore`, `ContextSource`)
//! - The `ProtocolClient` that runs one REQUEST → ACK → RESULT cycle in the
//!   correct trust order
//! - REQUEST/ACK/RESULT correlation over the event log
//! - `WorkspaceContext`, which gathers the diff, CI statuses and governance
//!   hash from a git checkout
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auditgate_core::{ProtocolClient, traits::{Auditor, EventStore, PolicyEngine}};
//! ```

pub mod client;
pub mod context;
pub mod correlation;
pub mod traits;

pub use client::{exit, exit_code_for, AuditOutcome, ProtocolClient};
pub use context::WorkspaceContext;
