//! Command-line arguments.
//!
//! sshgate is normally invoked from a `command="..."` entry in
//! `authorized_keys`, so the arguments come from the key owner, never from
//! the SSH client. The requested command itself arrives through
//! `SSH_ORIGINAL_COMMAND`.

use std::path::PathBuf;

use clap::Parser;

/// Variable sshd sets to the command requested by the client.
pub const ORIGINAL_COMMAND_ENV: &str = "SSH_ORIGINAL_COMMAND";

/// Variable naming the policy file, equivalent to `--config`.
pub const CONFIG_FILE_ENV: &str = "SSHGATE_CONFIG_FILE";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "sshgate",
    version,
    about = "Restrict an SSH key to an allow-list of commands",
    long_about = "Restrict an SSH key to an allow-list of commands.\n\n\
        Reads the requested command from SSH_ORIGINAL_COMMAND, checks it \
        against the policy file and runs it only when allowed. Tags select \
        overlays from the policy's keyTags section, applied in order."
)]
pub struct Cli {
    /// Policy file to load. Ignored when the file does not exist.
    #[arg(short, long, value_name = "PATH", env = CONFIG_FILE_ENV)]
    pub config: Option<PathBuf>,

    /// Tags whose overlays are merged onto the base policy.
    #[arg(value_name = "TAG")]
    pub tags: Vec<String>,
}
