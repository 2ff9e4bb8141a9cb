//! Launching authorized commands.
//!
//! The child inherits stdin. Its stdout and stderr are piped, copied to our
//! own stdout and stderr as they arrive, and captured in arrival order so the
//! caller can log what the command printed.

use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;

use sshgate_policy::ExecutionPlan;
use thiserror::Error;
use tracing::{debug, warn};

const CHUNK_SIZE: usize = 8 * 1024;

/// Errors raised while running a planned command.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for child process: {source}")]
    Wait {
        #[source]
        source: io::Error,
    },
}

/// How the child finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// The child exited with this code.
    Code(i32),
    /// No exit code is available, e.g. the child was killed by a signal.
    Unreported,
}

impl ExitState {
    fn from_status(status: ExitStatus) -> Self {
        status.code().map_or(ExitState::Unreported, ExitState::Code)
    }

    /// Code to exit with after the child. A child without a code maps to 1.
    pub fn exit_code(self) -> i32 {
        match self {
            ExitState::Code(code) => code,
            ExitState::Unreported => 1,
        }
    }
}

/// Result of a finished child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub status: ExitState,
    /// Stdout and stderr interleaved in the order they were read.
    pub output: String,
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Runs an [`ExecutionPlan`] to completion.
#[derive(Debug, Clone, Copy)]
pub struct Runner {
    relay: bool,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Runner that relays child output to this process.
    pub fn new() -> Self {
        Self { relay: true }
    }

    /// Runner that only captures child output.
    pub fn quiet() -> Self {
        Self { relay: false }
    }

    pub fn run(&self, plan: &ExecutionPlan) -> Result<ProcessOutput, ExecError> {
        let mut command = Command::new(&plan.program);
        command
            .args(&plan.args)
            .envs(&plan.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(command = %plan.command_line(), "Spawning child");
        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: plan.program.clone(),
            source,
        })?;

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            let tx = tx.clone();
            let relay = self.relay;
            readers.push(thread::spawn(move || pump(stdout, Stream::Stdout, relay, tx)));
        }
        if let Some(stderr) = child.stderr.take() {
            let tx = tx.clone();
            let relay = self.relay;
            readers.push(thread::spawn(move || pump(stderr, Stream::Stderr, relay, tx)));
        }
        drop(tx);

        let mut captured = Vec::new();
        for chunk in rx.iter() {
            captured.extend_from_slice(&chunk);
        }
        for reader in readers {
            if reader.join().is_err() {
                warn!("Output reader thread panicked");
            }
        }

        let status = child.wait().map_err(|source| ExecError::Wait { source })?;
        let status = ExitState::from_status(status);
        debug!(?status, "Child finished");

        Ok(ProcessOutput {
            status,
            output: String::from_utf8_lossy(&captured).into_owned(),
        })
    }
}

/// Copy `reader` to the matching stream of this process and to `tx` until EOF.
fn pump<R: Read>(mut reader: R, stream: Stream, relay: bool, tx: mpsc::Sender<Vec<u8>>) {
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(?stream, error = %e, "Stopped reading child output");
                break;
            }
        };

        if relay {
            let written = match stream {
                Stream::Stdout => write_through(&mut io::stdout().lock(), &buf[..n]),
                Stream::Stderr => write_through(&mut io::stderr().lock(), &buf[..n]),
            };
            if let Err(e) = written {
                debug!(?stream, error = %e, "Unable to relay child output");
            }
        }

        if tx.send(buf[..n].to_vec()).is_err() {
            break;
        }
    }
}

fn write_through<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}
