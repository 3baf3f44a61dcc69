//! Builds the pipeline components from a `GateConfig`.

use std::path::Path;

use tracing::warn;

use auditgate_auditor::HttpAuditor;
use auditgate_contracts::{config::GateConfig, error::GateResult};
use auditgate_core::{
    traits::{Auditor, ContextSource, EventStore},
    ProtocolClient, WorkspaceContext,
};
use auditgate_policy::GatePolicyEngine;
use auditgate_store::FsEventStore;
use auditgate_verify::{GuardrailReport, ProofGuardrail, SchemaOutputVerifier};

/// The auditor named by `[auditor]`, or `None` for placeholder mode.
///
/// A client that cannot be constructed is treated like a missing credential.
pub fn build_auditor(
    config: &GateConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<Box<dyn Auditor>> {
    match HttpAuditor::from_settings(&config.auditor, lookup) {
        Ok(auditor) => auditor.map(|a| Box::new(a) as Box<dyn Auditor>),
        Err(e) => {
            warn!(error = %e, "auditor client unavailable, continuing in placeholder mode");
            None
        }
    }
}

/// Assemble a `ProtocolClient` over an explicit store and context source.
pub fn assemble_client(
    config: &GateConfig,
    store: Box<dyn EventStore>,
    context: Box<dyn ContextSource>,
    lookup: impl Fn(&str) -> Option<String>,
) -> GateResult<ProtocolClient> {
    Ok(ProtocolClient::new(
        store,
        context,
        build_auditor(config, lookup),
        Box::new(SchemaOutputVerifier::new()?),
        Box::new(GatePolicyEngine::from_settings(&config.policy)),
    ))
}

/// The production client: file store from `[store] dir`, git context at
/// `repo_root`, credential from the process environment.
pub fn build_client(config: &GateConfig, repo_root: &Path) -> GateResult<ProtocolClient> {
    let store = FsEventStore::open(&config.store.dir)?;
    assemble_client(
        config,
        Box::new(store),
        Box::new(WorkspaceContext::from_config(repo_root, config)),
        |name| std::env::var(name).ok(),
    )
}

/// Run the guardrail over `dir`. A directory that does not exist holds no
/// artifacts and is clean.
pub fn run_guardrail(dir: &Path) -> GateResult<GuardrailReport> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "no event store directory, nothing to check");
        return Ok(GuardrailReport::default());
    }
    let store = FsEventStore::open(dir)?;
    ProofGuardrail::new(&store).audit()
}
