//! sshgate command-line front end.
//!
//! - `args` - command-line parsing
//! - `loader` - policy file lookup and parsing
//! - `logging` - audit log file setup
//! - `handler` - one invocation, from policy to exit code

pub mod args;
pub mod handler;
pub mod loader;
pub mod logging;
pub mod user;

pub use args::Cli;
pub use handler::{Outcome, run};
pub use loader::ConfigError;
