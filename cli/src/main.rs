//! protocolo: the auditgate CI and operator entry point.
//!
//! Usage:
//!   protocolo run-audit --pr 42            # REQUEST → ACK → RESULT, exit 0/1/2
//!   protocolo run-audit --week 2026-W42    # weekly system audit
//!   protocolo guardrail                    # proof-of-origin gate, exit 0/1
//!   protocolo audit | fix | dashboard | pr-status
//!
//! Exit codes: 0 approved or success, 1 internal error or guardrail
//! violation, 2 verdict other than APPROVED.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::error;

use auditgate_cli::{gates, init_tracing, operator, parse_error_code, wiring};
use auditgate_contracts::{
    config::GateConfig,
    error::GateResult,
    policy::format_reasons,
    request::{ArtifactKey, RunContext},
};
use auditgate_core::{exit, AuditOutcome};

// ── CLI definition ────────────────────────────────────────────────────────────

/// auditgate: deterministic merge gate with provable audit artifacts.
#[derive(Parser)]
#[command(name = "protocolo", version, about = "auditgate PR audit pipeline")]
struct Cli {
    /// Config file (default: ./auditgate.toml when present).
    #[arg(long, global = true, env = "AUDITGATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one REQUEST → ACK → RESULT audit cycle.
    RunAudit(RunAuditArgs),
    /// Verify every ACK/RESULT artifact against its proof of origin.
    Guardrail {
        /// Event store directory (default: `[store] dir`).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Run lint, typecheck, build, tests, guardrail and security scan.
    Audit,
    /// Run the formatter, then the linter autofix.
    Fix,
    /// Print environment, branch and script presence.
    Dashboard,
    /// List open pull requests through the GitHub CLI.
    PrStatus,
}

#[derive(Args)]
struct RunAuditArgs {
    /// Pull request number.
    #[arg(long, conflicts_with = "week", required_unless_present = "week")]
    pr: Option<u64>,
    /// ISO week id for the weekly system audit, e.g. 2026-W42.
    #[arg(long)]
    week: Option<String>,
    #[arg(long, env = "GITHUB_SHA")]
    sha: String,
    #[arg(long, env = "GITHUB_ACTOR")]
    actor: String,
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: String,
    #[arg(long, env = "GITHUB_RUN_ID")]
    run_id: String,
    #[arg(long, env = "GITHUB_RUN_ATTEMPT", default_value_t = 1)]
    run_attempt: u32,
    /// Checkout to diff and read the governance document from.
    #[arg(long, default_value = ".")]
    repo_root: PathBuf,
}

impl RunAuditArgs {
    fn run_context(&self) -> RunContext {
        let key = match (&self.week, self.pr) {
            (Some(week), _) => ArtifactKey::Week(week.clone()),
            (None, Some(pr)) => ArtifactKey::Pr(pr),
            (None, None) => ArtifactKey::Week(String::new()),
        };
        RunContext {
            key,
            sha: self.sha.clone(),
            actor: self.actor.clone(),
            repo: self.repo.clone(),
            run_id: self.run_id.clone(),
            run_attempt: self.run_attempt,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = parse_error_code(&e);
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "protocolo failed");
            eprintln!("error: {e}");
            exit::INTERNAL_ERROR
        }
    };
    std::process::exit(code);
}

fn dispatch(cli: Cli) -> GateResult<i32> {
    let config = GateConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::RunAudit(args) => run_audit(&config, &args),
        Command::Guardrail { dir } => guardrail(dir.as_deref().unwrap_or(config.store.dir.as_path())),
        Command::Audit => gates::run_plan(
            &gates::audit_plan(&config.gates),
            gates::run_command,
            || guardrail(&config.store.dir),
        ),
        Command::Fix => gates::run_plan(&gates::fix_plan(&config.gates), gates::run_command, || Ok(0)),
        Command::Dashboard => {
            let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            for (label, value) in operator::dashboard(&config, &root, |n| std::env::var(n).ok()) {
                println!("{label:<20} {value}");
            }
            Ok(0)
        }
        Command::PrStatus => operator::pr_status(),
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn run_audit(config: &GateConfig, args: &RunAuditArgs) -> GateResult<i32> {
    let run = args.run_context();
    run.validate()?;

    let client = wiring::build_client(config, &args.repo_root)?;
    let outcome = client.run_audit(&run)?;
    print_outcome(&outcome);
    Ok(outcome.exit_code())
}

fn print_outcome(outcome: &AuditOutcome) {
    let result = &outcome.result;
    println!("key:        {}", result.key);
    println!("verdict:    {}", result.verdict);
    println!("risk_level: {}", result.risk_level);
    println!("reasons:    {}", format_reasons(&result.reasons));
    if result.placeholder {
        println!("auditor:    placeholder review (no auditor reply)");
    }
    for finding in &result.findings {
        println!("finding:    {finding}");
    }
    println!(
        "proof:      {} sha256={}",
        outcome.result_proof.artifact, outcome.result_proof.output_hash_sha256
    );
}

fn guardrail(dir: &Path) -> GateResult<i32> {
    let report = wiring::run_guardrail(dir)?;
    for v in &report.violations {
        println!("VIOLATION {}: {} ({})", v.artifact, v.kind, v.proof);
    }
    if report.is_clean() {
        println!("guardrail: {} artifact(s) verified in {}", report.checked, dir.display());
    } else {
        println!(
            "guardrail: {} of {} artifact(s) failed provenance in {}",
            report.violations.len(),
            report.checked,
            dir.display()
        );
    }
    Ok(report.exit_code())
}
