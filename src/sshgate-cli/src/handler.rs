//! One sshgate invocation, from policy loading to exit code.

use std::io::{self, Write};

use anyhow::{Context, Result};
use sshgate_exec::Runner;
use sshgate_policy::{Diagnostics, DenyReason, Policy, authorize, render_denial};
use tracing::{error, info, warn};

use crate::args::{Cli, ORIGINAL_COMMAND_ENV};
use crate::loader::{find_config, load_policy};
use crate::logging::{AUDIT_TARGET, init_logging};
use crate::user::current_user;

/// Exit code for a refused command.
pub const EXIT_DENIED: i32 = 1;

/// Exit code when the policy could not be loaded.
pub const EXIT_CONFIG: i32 = 2;

/// What the invocation ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub exit_code: i32,
    /// Text shown to the client: the denial, or everything the child printed.
    pub message: String,
}

/// Run sshgate for the current process.
///
/// Errors are limited to failures writing to our own stdout; every policy,
/// denial and child failure is expressed through the returned [`Outcome`].
pub fn run(cli: &Cli) -> Result<Outcome> {
    let loaded = find_config(cli.config.as_deref()).and_then(|path| load_policy(&path));
    let base = match loaded {
        Ok(policy) => policy,
        Err(e) => {
            let message = format!("Could not load config file : {e}\n");
            emit(&message)?;
            return Ok(Outcome {
                exit_code: EXIT_CONFIG,
                message,
            });
        }
    };

    let policy = base.with_tags(&cli.tags);
    let _log_guard = init_logging(&policy);

    let raw = std::env::var(ORIGINAL_COMMAND_ENV).ok();
    let context = Invocation {
        user: current_user(),
        tags: cli.tags.join(","),
    };
    handle(&policy, raw.as_deref(), &context, Runner::new())
}

/// Who asked, for audit lines.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub user: String,
    pub tags: String,
}

/// Authorize `raw` against `policy` and run it or refuse it.
pub fn handle(
    policy: &Policy,
    raw: Option<&str>,
    invocation: &Invocation,
    runner: Runner,
) -> Result<Outcome> {
    let mut diagnostics = Diagnostics::new();
    let plan = match authorize(policy, raw, &mut diagnostics) {
        Ok(plan) => plan,
        Err(reason) => return deny(policy, &reason, invocation, &diagnostics),
    };

    info!(
        target: AUDIT_TARGET,
        user = %invocation.user,
        tags = %invocation.tags,
        outcome = "running",
        command = %plan.command_line(),
        regex_issues = %diagnostics.summary(),
        "Running command"
    );

    match runner.run(&plan) {
        Ok(output) => {
            let exit_code = output.status.exit_code();
            info!(
                target: AUDIT_TARGET,
                user = %invocation.user,
                tags = %invocation.tags,
                outcome = "finished",
                command = %plan.command_line(),
                exit_code,
                regex_issues = %diagnostics.summary(),
                "Command finished"
            );
            Ok(Outcome {
                exit_code,
                message: output.output,
            })
        }
        Err(e) => {
            error!(
                target: AUDIT_TARGET,
                user = %invocation.user,
                tags = %invocation.tags,
                outcome = "failed",
                command = %plan.command_line(),
                error = %e,
                regex_issues = %diagnostics.summary(),
                "Command could not be run"
            );
            let message = format!("{e}\n");
            eprint!("{message}");
            Ok(Outcome {
                exit_code: EXIT_DENIED,
                message,
            })
        }
    }
}

fn deny(
    policy: &Policy,
    reason: &DenyReason,
    invocation: &Invocation,
    diagnostics: &Diagnostics,
) -> Result<Outcome> {
    warn!(
        target: AUDIT_TARGET,
        user = %invocation.user,
        tags = %invocation.tags,
        outcome = "denied",
        kind = reason.kind(),
        reason = %reason,
        regex_issues = %diagnostics.summary(),
        "Command denied"
    );

    let message = render_denial(policy, reason);
    emit(&message)?;
    Ok(Outcome {
        exit_code: EXIT_DENIED,
        message,
    })
}

fn emit(message: &str) -> Result<()> {
    if message.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(message.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write to stdout")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sshgate_policy::Rule;

    use super::*;

    fn policy(rules: Vec<Rule>) -> Policy {
        Policy {
            show_denied: Some(true),
            allowed_commands: rules,
            ..Policy::default()
        }
    }

    fn handle_quiet(policy: &Policy, raw: Option<&str>) -> Outcome {
        handle(policy, raw, &Invocation::default(), Runner::quiet()).unwrap()
    }

    #[test]
    fn test_missing_command() {
        let outcome = handle_quiet(&policy(vec![Rule::new("ls")]), None);
        assert_eq!(outcome.exit_code, EXIT_DENIED);
        assert_eq!(
            outcome.message,
            "Denied : direct ssh not allowed, you must specify a command\n"
        );
    }

    #[test]
    fn test_unlisted_command() {
        let outcome = handle_quiet(&policy(vec![Rule::new("ls")]), Some("rm -rf /"));
        assert_eq!(outcome.exit_code, EXIT_DENIED);
        assert_eq!(outcome.message, "Denied : command `rm` not allowed\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_allowed_command_output_is_message() {
        let outcome = handle_quiet(&policy(vec![Rule::new("echo")]), Some("echo test"));
        assert_eq!(
            outcome,
            Outcome {
                exit_code: 0,
                message: "test\n".to_string()
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_child_exit_code_is_returned() {
        let outcome = handle_quiet(&policy(vec![Rule::new("sh")]), Some("sh -c 'exit 4'"));
        assert_eq!(outcome.exit_code, 4);
    }

    #[test]
    fn test_spawn_failure_exits_one() {
        let outcome = handle_quiet(
            &policy(vec![Rule::new("/nonexistent/sshgate-missing")]),
            Some("/nonexistent/sshgate-missing"),
        );
        assert_eq!(outcome.exit_code, EXIT_DENIED);
        assert!(outcome.message.contains("failed to start"));
    }
}
