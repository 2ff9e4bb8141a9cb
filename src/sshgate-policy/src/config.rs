//! Policy configuration.
//!
//! Field names follow the camelCase keys of the YAML policy file. Maps are
//! `IndexMap`s because `replace` patterns are applied in declaration order.

use indexmap::IndexMap;
use serde::Deserialize;

/// `useShell` value that selects the invoking user's login shell.
pub const LOGIN_SHELL_SENTINEL: &str = "default";

/// The effective gatekeeper policy, or a partial overlay of one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    /// Print only `Denied` on refusal, overriding every other output flag.
    pub show_terse_denied: Option<bool>,

    /// Print the denial reason.
    pub show_denied: Option<bool>,

    /// Print the list of allowed commands on refusal.
    pub show_allowed: Option<bool>,

    /// Expand `$NAME` references in the argument string before launch.
    pub expand_env_vars: Option<bool>,

    /// Write audit lines to the log file.
    pub enable_logging: Option<bool>,

    /// Log file path. Empty means the default location.
    pub log_file: Option<String>,

    /// Shell used to run allowed commands, or `default` for `$SHELL`.
    pub use_shell: Option<String>,

    /// Extra text appended to denial output.
    pub help_text: Option<String>,

    /// Environment variables set for every command.
    pub set_env_vars: IndexMap<String, String>,

    /// Allowed commands, evaluated in order.
    #[serde(rename = "allowedCmd")]
    pub allowed_commands: Vec<Rule>,

    /// Overlays selected by invocation tags.
    pub key_tags: IndexMap<String, Policy>,
}

/// One entry of `allowedCmd`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Absolute path or bare program name.
    pub command: String,

    /// Per-token argument policy. `None` means no token checks at all.
    #[serde(default)]
    pub args: Option<ArgPolicy>,

    /// Regex to replacement, applied to the argument string in order.
    #[serde(default)]
    pub replace: IndexMap<String, String>,

    /// Environment variables set for this command only.
    #[serde(default)]
    pub set_env_vars: IndexMap<String, String>,

    /// Patterns the whole argument string must match.
    #[serde(default)]
    pub must_match: Vec<String>,
}

/// Allowed and forbidden regexes checked against every argument token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArgPolicy {
    /// When non-empty, each token must match one of these.
    pub allowed: Vec<String>,

    /// A token matching any of these is refused.
    pub forbidden: Vec<String>,
}

/// Which shell, if any, wraps the allowed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellSelection {
    /// The shell named by `$SHELL`.
    LoginShell,
    /// A shell path or a name looked up in the search path.
    Program(String),
}

/// Which parts of a denial are disclosed to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity {
    pub terse: bool,
    pub show_denied: bool,
    pub show_allowed: bool,
}

impl Policy {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity {
            terse: self.show_terse_denied.unwrap_or(false),
            show_denied: self.show_denied.unwrap_or(false),
            show_allowed: self.show_allowed.unwrap_or(false),
        }
    }

    pub fn expands_env_vars(&self) -> bool {
        self.expand_env_vars.unwrap_or(false)
    }

    pub fn logging_enabled(&self) -> bool {
        self.enable_logging.unwrap_or(false)
    }

    /// Configured log file, ignoring an empty value.
    pub fn log_file(&self) -> Option<&str> {
        non_empty(&self.log_file)
    }

    pub fn help_text(&self) -> Option<&str> {
        non_empty(&self.help_text)
    }

    /// Shell selection, or `None` to execute commands directly.
    pub fn shell(&self) -> Option<ShellSelection> {
        non_empty(&self.use_shell).map(|shell| {
            if shell == LOGIN_SHELL_SENTINEL {
                ShellSelection::LoginShell
            } else {
                ShellSelection::Program(shell.to_string())
            }
        })
    }

    /// Command names of all rules, in evaluation order.
    pub fn allowed_command_names(&self) -> Vec<&str> {
        self.allowed_commands
            .iter()
            .map(|rule| rule.command.as_str())
            .collect()
    }

    /// First rule declared for exactly `command`.
    pub fn rule(&self, command: &str) -> Option<&Rule> {
        self.allowed_commands
            .iter()
            .find(|rule| rule.command == command)
    }
}

impl Rule {
    /// A rule allowing `command` with no argument restrictions.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_forbidden<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .get_or_insert_with(ArgPolicy::default)
            .forbidden
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_allowed<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .get_or_insert_with(ArgPolicy::default)
            .allowed
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_replace(mut self, pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.replace.insert(pattern.into(), replacement.into());
        self
    }

    pub fn with_env_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_env_vars.insert(name.into(), value.into());
        self
    }

    pub fn with_must_match(mut self, pattern: impl Into<String>) -> Self {
        self.must_match.push(pattern.into());
        self
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
