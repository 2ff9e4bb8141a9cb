//! The end-to-end authorization pipeline.

use tracing::debug;

use crate::arguments::evaluate;
use crate::config::Policy;
use crate::diagnostics::Diagnostics;
use crate::env::Environment;
use crate::error::DenyReason;
use crate::launch::{ExecutionPlan, plan};
use crate::matcher::find_rule;
use crate::resolve::{ExecutableResolver, SearchPath};
use crate::tokenize::CommandLine;

/// Decides whether a forced command may run, and how.
///
/// Holds no state besides its inputs; one instance serves one invocation.
pub struct Gatekeeper<'p, R = SearchPath> {
    policy: &'p Policy,
    resolver: R,
    environment: Environment,
}

impl<'p> Gatekeeper<'p, SearchPath> {
    /// Gatekeeper using the process search path and environment.
    pub fn new(policy: &'p Policy) -> Self {
        Self {
            policy,
            resolver: SearchPath::from_env(),
            environment: Environment::from_process(),
        }
    }
}

impl<'p, R: ExecutableResolver> Gatekeeper<'p, R> {
    pub fn with_resolver(policy: &'p Policy, resolver: R, environment: Environment) -> Self {
        Self {
            policy,
            resolver,
            environment,
        }
    }

    /// Authorize `raw`, the command the client asked for.
    ///
    /// `None` and the empty string both mean the client asked for no command.
    pub fn authorize(
        &self,
        raw: Option<&str>,
        diagnostics: &mut Diagnostics,
    ) -> Result<ExecutionPlan, DenyReason> {
        let raw = raw
            .filter(|command| !command.is_empty())
            .ok_or(DenyReason::NoCommandSpecified)?;

        let line = CommandLine::parse(raw)?.ok_or(DenyReason::NoCommandSpecified)?;

        let rule = find_rule(self.policy, &line.program, &self.resolver).ok_or_else(|| {
            DenyReason::CommandNotAllowed {
                program: line.program.clone(),
            }
        })?;
        debug!(program = %line.program, rule = %rule.command, "Matched allowed command");

        let rewritten = evaluate(rule, &line.args_string, &line.args, diagnostics)?;
        if rewritten != line.args_string {
            debug!(before = %line.args_string, after = %rewritten, "Arguments rewritten");
        }

        plan(
            rule,
            self.policy,
            &rewritten,
            &self.environment,
            &self.resolver,
        )
    }
}
