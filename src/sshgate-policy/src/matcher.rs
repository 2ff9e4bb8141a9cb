//! Selection of the rule governing an invoked program.

use std::ffi::OsStr;

use crate::config::{Policy, Rule};
use crate::resolve::ExecutableResolver;

/// Find the first rule in `policy` that matches `program`.
///
/// - An absolute rule command matches only the identical string.
/// - A bare rule command matches an absolute `program` when the search path
///   resolves it to exactly that path.
/// - Two bare names match when they are equal.
///
/// There is no specificity ranking: declaration order decides.
pub fn find_rule<'p, R>(policy: &'p Policy, program: &str, resolver: &R) -> Option<&'p Rule>
where
    R: ExecutableResolver + ?Sized,
{
    policy
        .allowed_commands
        .iter()
        .find(|rule| rule_matches(rule, program, resolver))
}

fn rule_matches<R>(rule: &Rule, program: &str, resolver: &R) -> bool
where
    R: ExecutableResolver + ?Sized,
{
    let allowed = rule.command.as_str();

    if is_absolute(allowed) {
        return allowed == program;
    }

    if is_absolute(program)
        && let Some(resolved) = resolver.resolve(allowed)
    {
        return resolved.as_os_str() == OsStr::new(program);
    }

    allowed == program
}

fn is_absolute(command: &str) -> bool {
    command.starts_with('/')
}
