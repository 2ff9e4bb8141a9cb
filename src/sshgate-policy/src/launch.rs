//! Launch planning: turning an authorized rule into a concrete invocation.

use indexmap::IndexMap;

use crate::config::{LOGIN_SHELL_SENTINEL, Policy, Rule, ShellSelection};
use crate::env::Environment;
use crate::error::DenyReason;
use crate::resolve::ExecutableResolver;
use crate::tokenize::tokenize;

/// A fully resolved process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Program to spawn. A shell path when the policy selects a shell.
    pub program: String,

    /// Arguments passed after the program.
    pub args: Vec<String>,

    /// Variables set on top of the inherited environment, global ones first.
    pub env: IndexMap<String, String>,

    /// Whether `program` is a shell wrapping the allowed command.
    pub via_shell: bool,
}

impl ExecutionPlan {
    /// Space-joined invocation, for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Build the invocation for `rule` with its already rewritten argument string.
///
/// Global `setEnvVars` apply first and the rule's own override them. With
/// `expandEnvVars` the argument string is expanded against `base` plus those
/// variables. A configured shell receives `<command> <args>` through `-c`;
/// otherwise the line is tokenized again into a literal argv whose program is
/// the rule's declared command.
pub fn plan<R>(
    rule: &Rule,
    policy: &Policy,
    args_string: &str,
    base: &Environment,
    resolver: &R,
) -> Result<ExecutionPlan, DenyReason>
where
    R: ExecutableResolver + ?Sized,
{
    let mut env = IndexMap::new();
    for (name, value) in policy.set_env_vars.iter().chain(&rule.set_env_vars) {
        env.insert(name.clone(), value.clone());
    }

    let mut effective = base.clone();
    effective.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));

    let arguments = if policy.expands_env_vars() {
        effective.expand(args_string)
    } else {
        args_string.to_string()
    };

    if let Some(selection) = policy.shell() {
        let shell = match selection {
            ShellSelection::LoginShell => effective
                .get("SHELL")
                .unwrap_or(LOGIN_SHELL_SENTINEL)
                .to_string(),
            ShellSelection::Program(shell) => shell,
        };
        let shell_path = resolver
            .resolve(&shell)
            .ok_or(DenyReason::ShellNotFound { shell })?;

        return Ok(ExecutionPlan {
            program: shell_path.to_string_lossy().into_owned(),
            args: vec!["-c".to_string(), format!("{} {}", rule.command, arguments)],
            env,
            via_shell: true,
        });
    }

    let argv = tokenize(&format!("{} {}", rule.command, arguments)).map_err(|source| {
        DenyReason::ArgReparse {
            arguments: arguments.clone(),
            source,
        }
    })?;

    Ok(ExecutionPlan {
        program: rule.command.clone(),
        args: argv.into_iter().skip(1).collect(),
        env,
        via_shell: false,
    })
}
