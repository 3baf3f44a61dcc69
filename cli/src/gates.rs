//! Operator gate sequences for `protocolo audit` and `protocolo fix`.
//!
//! A plan is an ordered list of steps. Execution stops at the first step that
//! exits non-zero, and that exit code becomes the process exit code. The
//! proof-of-origin guardrail runs in-process as one of the steps.

use std::process::Command;

use tracing::{info, warn};

use auditgate_contracts::{
    config::GateCommands,
    error::{GateError, GateResult},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// An external command, as argv. Empty means "not configured".
    Command(Vec<String>),
    /// The in-process proof-of-origin guardrail.
    Guardrail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateStep {
    pub name: &'static str,
    pub action: StepAction,
}

impl GateStep {
    fn command(name: &'static str, argv: &[String]) -> Self {
        Self {
            name,
            action: StepAction::Command(argv.to_vec()),
        }
    }
}

/// lint → typecheck → build → frontend tests → backend tests → guardrail → security.
pub fn audit_plan(gates: &GateCommands) -> Vec<GateStep> {
    vec![
        GateStep::command("lint", &gates.lint),
        GateStep::command("typecheck", &gates.typecheck),
        GateStep::command("build", &gates.build),
        GateStep::command("test-frontend", &gates.test_frontend),
        GateStep::command("test-backend", &gates.test_backend),
        GateStep {
            name: "guardrail",
            action: StepAction::Guardrail,
        },
        GateStep::command("security", &gates.security),
    ]
}

/// formatter → linter autofix.
pub fn fix_plan(gates: &GateCommands) -> Vec<GateStep> {
    vec![
        GateStep::command("format", &gates.format),
        GateStep::command("lint-fix", &gates.lint_fix),
    ]
}

/// Run `argv` with inherited stdio and return its exit code.
///
/// A child killed by a signal reports `1`.
pub fn run_command(argv: &[String]) -> GateResult<i32> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(0);
    };
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| GateError::CommandFailed {
            command: argv.join(" "),
            reason: e.to_string(),
        })?;
    Ok(status.code().unwrap_or(1))
}

/// Execute `plan` in order, stopping at the first non-zero step.
///
/// `exec` runs command steps and `guardrail` runs the guardrail step; both
/// return an exit code.
pub fn run_plan(
    plan: &[GateStep],
    mut exec: impl FnMut(&[String]) -> GateResult<i32>,
    mut guardrail: impl FnMut() -> GateResult<i32>,
) -> GateResult<i32> {
    for (i, step) in plan.iter().enumerate() {
        let code = match &step.action {
            StepAction::Command(argv) if argv.is_empty() => {
                warn!(step = step.name, "no command configured, skipping");
                continue;
            }
            StepAction::Command(argv) => {
                println!("[{}/{}] {}: {}", i + 1, plan.len(), step.name, argv.join(" "));
                exec(argv)?
            }
            StepAction::Guardrail => {
                println!("[{}/{}] {}", i + 1, plan.len(), step.name);
                guardrail()?
            }
        };
        if code != 0 {
            println!("{} failed with exit code {code}", step.name);
            return Ok(code);
        }
        info!(step = step.name, "gate passed");
    }
    println!("all {} gates passed", plan.len());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn argv(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn audit_plan_runs_guardrail_before_security() {
        let names: Vec<&str> = audit_plan(&GateCommands::default())
            .iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(
            names,
            vec!["lint", "typecheck", "build", "test-frontend", "test-backend", "guardrail", "security"]
        );
    }

    #[test]
    fn first_failure_stops_the_plan_and_propagates_its_code() {
        let ran = RefCell::new(Vec::new());
        let gates = GateCommands {
            build: argv("fail-with 3"),
            ..GateCommands::default()
        };

        let code = run_plan(
            &audit_plan(&gates),
            |argv| {
                ran.borrow_mut().push(argv.join(" "));
                Ok(if argv[0] == "fail-with" { 3 } else { 0 })
            },
            || panic!("guardrail must not run after a failed build"),
        )
        .unwrap();

        assert_eq!(code, 3);
        assert_eq!(ran.borrow().len(), 3);
    }

    #[test]
    fn guardrail_failure_blocks_security_scan() {
        let ran = RefCell::new(0);
        let code = run_plan(
            &audit_plan(&GateCommands::default()),
            |_| {
                *ran.borrow_mut() += 1;
                Ok(0)
            },
            || Ok(1),
        )
        .unwrap();
        assert_eq!(code, 1);
        assert_eq!(*ran.borrow(), 5);
    }

    #[test]
    fn unconfigured_steps_are_skipped() {
        let gates = GateCommands {
            format: vec![],
            ..GateCommands::default()
        };
        let ran = RefCell::new(Vec::new());
        let code = run_plan(
            &fix_plan(&gates),
            |argv| {
                ran.borrow_mut().push(argv[0].clone());
                Ok(0)
            },
            || Ok(0),
        )
        .unwrap();
        assert_eq!(code, 0);
        assert_eq!(*ran.borrow(), vec!["npm".to_string()]);
    }

    #[test]
    fn real_commands_report_their_exit_code() {
        assert_eq!(run_command(&argv("sh -c true")).unwrap(), 0);
        assert_eq!(run_command(&["sh".into(), "-c".into(), "exit 4".into()]).unwrap(), 4);
        assert!(matches!(
            run_command(&argv("definitely-not-a-real-binary-7f3a")),
            Err(GateError::CommandFailed { .. })
        ));
    }
}
