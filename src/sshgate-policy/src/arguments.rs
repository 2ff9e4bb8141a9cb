//! Argument checks and rewriting for a matched rule.

use regex::Regex;

use crate::config::Rule;
use crate::diagnostics::{Diagnostics, PatternCheck};
use crate::error::DenyReason;

/// Check the arguments of a command against `rule` and apply its rewrites.
///
/// Checks run in a fixed order and the first failure wins:
///
/// 1. every token against `args.forbidden`
/// 2. every token against `args.allowed`, when it is non-empty
/// 3. the whole `args_string` against each `mustMatch` pattern
///
/// Surviving arguments then go through each `replace` pattern in declaration
/// order, every substitution seeing the output of the previous one.
///
/// Patterns that do not compile are recorded in `diagnostics` and left out.
/// If every `allowed` pattern is broken the allow-list check is skipped.
pub fn evaluate(
    rule: &Rule,
    args_string: &str,
    args_tokens: &[String],
    diagnostics: &mut Diagnostics,
) -> Result<String, DenyReason> {
    if let Some(args) = &rule.args {
        let forbidden = compile_all(&args.forbidden, PatternCheck::Forbidden, diagnostics);
        let allowed = compile_all(&args.allowed, PatternCheck::Allowed, diagnostics);

        for token in args_tokens {
            if let Some((pattern, _)) = forbidden.iter().find(|(_, re)| re.is_match(token)) {
                return Err(DenyReason::ArgumentForbidden {
                    command: rule.command.clone(),
                    argument: token.clone(),
                    pattern: (*pattern).to_string(),
                });
            }

            if !allowed.is_empty() && !allowed.iter().any(|(_, re)| re.is_match(token)) {
                return Err(DenyReason::ArgumentNotAllowed {
                    command: rule.command.clone(),
                    argument: token.clone(),
                });
            }
        }
    }

    for (pattern, re) in compile_all(&rule.must_match, PatternCheck::MustMatch, diagnostics) {
        if !re.is_match(args_string) {
            return Err(DenyReason::MustMatchFailed {
                command: rule.command.clone(),
                arguments: args_string.to_string(),
                pattern: pattern.to_string(),
            });
        }
    }

    let mut rewritten = args_string.to_string();
    for (pattern, replacement) in &rule.replace {
        match Regex::new(pattern) {
            Ok(re) => rewritten = re.replace_all(&rewritten, replacement.as_str()).into_owned(),
            Err(e) => diagnostics.record(PatternCheck::Replace, pattern, &e),
        }
    }

    Ok(rewritten)
}

fn compile_all<'a>(
    patterns: &'a [String],
    check: PatternCheck,
    diagnostics: &mut Diagnostics,
) -> Vec<(&'a str, Regex)> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some((pattern.as_str(), re)),
            Err(e) => {
                diagnostics.record(check, pattern, &e);
                None
            }
        })
        .collect()
}
