//! Operator-facing notices collected while evaluating a command.
//!
//! A pattern that fails to compile disables the check it belongs to instead
//! of refusing the command. Those events are never shown to the client; they
//! are gathered here and logged.

use std::fmt;

use tracing::warn;

/// The check a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCheck {
    Forbidden,
    Allowed,
    MustMatch,
    Replace,
}

impl fmt::Display for PatternCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternCheck::Forbidden => write!(f, "forbidden"),
            PatternCheck::Allowed => write!(f, "allowed"),
            PatternCheck::MustMatch => write!(f, "mustMatch"),
            PatternCheck::Replace => write!(f, "replace"),
        }
    }
}

/// A pattern that could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternIssue {
    pub check: PatternCheck,
    pub pattern: String,
    pub message: String,
}

impl fmt::Display for PatternIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unable to compile {} regex `{}`: {}",
            self.check, self.pattern, self.message
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    issues: Vec<PatternIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a compile failure and emit it as a warning.
    pub fn record(&mut self, check: PatternCheck, pattern: &str, error: &regex::Error) {
        let issue = PatternIssue {
            check,
            pattern: pattern.to_string(),
            message: error
                .to_string()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        };
        warn!(%check, pattern, error = %error, "Unable to compile regex, check skipped");
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[PatternIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// One-line summary suitable for a log field.
    pub fn summary(&self) -> String {
        self.issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
