//! Error types for the policy engine.

use thiserror::Error;

/// Errors raised while splitting a command line into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// Input ended while a quoted section was still open.
    #[error("unclosed quote in command line: {command}")]
    UnterminatedQuote { command: String },
}

/// Reasons a forced command is refused.
///
/// The `Display` text is what operators see with `showDenied` enabled, so
/// wording changes here are user-visible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenyReason {
    /// The client opened a plain session without a command.
    #[error("direct ssh not allowed, you must specify a command")]
    NoCommandSpecified,

    /// The raw command line could not be tokenized.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// No rule in `allowedCmd` matched the invoked program.
    #[error("command `{program}` not allowed")]
    CommandNotAllowed { program: String },

    /// An argument token matched a forbidden pattern.
    #[error("command `{command}` argument : `{argument}` forbidden : regex `{pattern}`")]
    ArgumentForbidden {
        command: String,
        argument: String,
        pattern: String,
    },

    /// An argument token matched none of the allowed patterns.
    #[error("command `{command}` arguments : `{argument}` not allowed")]
    ArgumentNotAllowed { command: String, argument: String },

    /// The argument string failed a `mustMatch` pattern.
    #[error("command `{command}` arguments : `{arguments}` not matching regex `{pattern}`")]
    MustMatchFailed {
        command: String,
        arguments: String,
        pattern: String,
    },

    /// The configured shell could not be located.
    #[error("shell `{shell}` not found in path")]
    ShellNotFound { shell: String },

    /// The rewritten argument string no longer tokenizes.
    #[error("unable to parse arguments `{arguments}` : {source}")]
    ArgReparse {
        arguments: String,
        #[source]
        source: TokenizeError,
    },
}

impl DenyReason {
    /// Short machine-friendly label, used as the `kind` field in audit logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DenyReason::NoCommandSpecified => "no_command",
            DenyReason::Tokenize(_) => "tokenize",
            DenyReason::CommandNotAllowed { .. } => "command_not_allowed",
            DenyReason::ArgumentForbidden { .. } => "argument_forbidden",
            DenyReason::ArgumentNotAllowed { .. } => "argument_not_allowed",
            DenyReason::MustMatchFailed { .. } => "must_match_failed",
            DenyReason::ShellNotFound { .. } => "shell_not_found",
            DenyReason::ArgReparse { .. } => "arg_reparse",
        }
    }
}
