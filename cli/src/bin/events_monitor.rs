//! events-monitor: protocol deadline monitor for the auditgate event store.
//!
//! Usage:
//!   events-monitor monitor        # evaluate deadlines, write alert + state
//!   events-monitor status [--json]
//!   events-monitor clear          # remove the alert, reset state to OK

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::error;

use auditgate_cli::{init_tracing, parse_error_code};
use auditgate_contracts::{
    config::GateConfig,
    error::{GateError, GateResult},
};
use auditgate_core::exit;
use auditgate_monitor::{StatusView, TimeoutMonitor};
use auditgate_store::FsEventStore;

#[derive(Parser)]
#[command(name = "events-monitor", version, about = "auditgate protocol timeout monitor")]
struct Cli {
    /// Config file (default: ./auditgate.toml when present).
    #[arg(long, global = true, env = "AUDITGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Event store directory (default: `[store] dir`).
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check every open task against the ACK and RESULT deadlines.
    Monitor,
    /// Print the executor state and per-task protocol phase.
    Status {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Remove the alert file and reset the executor state to OK.
    Clear,
}

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
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "events-monitor failed");
            eprintln!("error: {e}");
            exit::INTERNAL_ERROR
        }
    };
    std::process::exit(code);
}

fn dispatch(cli: Cli) -> GateResult<()> {
    let config = GateConfig::load(cli.config.as_deref())?;
    let dir = cli.dir.unwrap_or_else(|| config.store.dir.clone());
    let store = FsEventStore::open(&dir)?;
    let monitor = TimeoutMonitor::new(&store, config.monitor.clone());

    match cli.command {
        Command::Monitor => {
            let report = monitor.run(Utc::now())?;
            println!("{}: {}", report.state.status.as_str(), report.state.message);
            for alert in &report.alerts {
                println!("  [{}] {}: {}", alert.severity.as_str(), alert.task_id, alert.message);
            }
        }
        Command::Status { json } => {
            let view = monitor.status()?;
            if json {
                let text =
                    serde_json::to_string_pretty(&view).map_err(|e| GateError::read("status", e))?;
                println!("{text}");
            } else {
                print_status(&view);
            }
        }
        Command::Clear => {
            let state = monitor.clear(Utc::now())?;
            println!("{}: {}", state.status.as_str(), state.message);
        }
    }
    Ok(())
}

fn print_status(view: &StatusView) {
    match &view.state {
        Some(state) => {
            println!(
                "executor: {} ({}), last update {}",
                state.status.as_str(),
                state.message,
                state.last_update.to_rfc3339()
            );
            for alert in &state.alerts {
                println!("  alert [{}] {}: {}", alert.severity.as_str(), alert.task_id, alert.message);
            }
        }
        None => println!("executor: never monitored"),
    }
    if view.tracks.is_empty() {
        println!("no protocol tasks in the event log");
        return;
    }
    println!("{:<24} {:<11} {}", "task", "phase", "since");
    for track in &view.tracks {
        let since = track
            .reference_time()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<24} {:<11} {since}", track.task_id, track.phase.as_str());
    }
}
