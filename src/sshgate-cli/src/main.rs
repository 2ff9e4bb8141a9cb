//! sshgate - main entry point.
//!
//! Meant to be set as the forced command of an SSH key:
//!
//! ```text
//! command="/usr/local/bin/sshgate ops" ssh-ed25519 AAAA... deploy@ci
//! ```

use anyhow::Result;
use clap::Parser;

use sshgate_cli::{Cli, run};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let outcome = run(&cli)?;
    std::process::exit(outcome.exit_code);
}
