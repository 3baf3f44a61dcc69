//! # auditgate-cli
//!
//! Shared plumbing for the `protocolo` and `events-monitor` binaries:
//! tracing setup, component wiring from `GateConfig`, the operator gate
//! runner and the read-only operator views.

pub mod gates;
pub mod operator;
pub mod wiring;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Exit code for a clap parse failure: help and version are successes,
/// everything else is a configuration error and never `2`.
pub fn parse_error_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        auditgate_core::exit::INTERNAL_ERROR
    } else {
        0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
