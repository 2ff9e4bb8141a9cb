//! sshgate policy - authorization engine for SSH forced commands.
//!
//! Decides whether the command an SSH client asked for may run:
//! - `Ok(ExecutionPlan)` - the program, argv and environment to launch
//! - `Err(DenyReason)` - why the command was refused
//!
//! # Features
//! - Shell-like tokenizing with quotes and escapes, but no shell semantics
//! - Ordered allow-list with path-aware program matching
//! - Per-token forbidden/allowed regexes and whole-line `mustMatch` regexes
//! - Regex rewriting of the argument string
//! - Tag overlays merged onto a base policy
//!
//! # Pipeline
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │        SSH_ORIGINAL_COMMAND                │
//! └────────────────────┬───────────────────────┘
//!                      │ tokenize
//!                      ▼
//! ┌────────────────────────────────────────────┐
//! │   First rule matching the program?         │──── no ───▶ DENY
//! └────────────────────┬───────────────────────┘
//!                      │ yes
//!                      ▼
//! ┌────────────────────────────────────────────┐
//! │   forbidden → allowed → mustMatch          │──── fail ─▶ DENY
//! └────────────────────┬───────────────────────┘
//!                      │ replace
//!                      ▼
//! ┌────────────────────────────────────────────┐
//! │   env vars, expansion, shell or argv       │──── fail ─▶ DENY
//! └────────────────────┬───────────────────────┘
//!                      ▼
//!                ExecutionPlan
//! ```


mod arguments;
mod config;
mod diagnostics;
mod env;
mod error;
mod gate;
mod launch;
mod matcher;
mod merge;
mod report;
mod resolve;
mod tokenize;

pub use arguments::evaluate;
pub use config::{ArgPolicy, LOGIN_SHELL_SENTINEL, Policy, Rule, ShellSelection, Verbosity};
pub use diagnostics::{Diagnostics, PatternCheck, PatternIssue};
pub use env::Environment;
pub use error::{DenyReason, TokenizeError};
pub use gate::Gatekeeper;
pub use launch::{ExecutionPlan, plan};
pub use matcher::find_rule;
pub use report::render_denial;
pub use resolve::{ExecutableResolver, SearchPath};
pub use tokenize::{CommandLine, tokenize};

/// Authorize `raw` against `policy` using the process search path and
/// environment.
pub fn authorize(
    policy: &Policy,
    raw: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> Result<ExecutionPlan, DenyReason> {
    Gatekeeper::new(policy).authorize(raw, diagnostics)
}
