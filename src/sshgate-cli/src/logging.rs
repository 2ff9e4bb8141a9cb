//! Audit log setup.
//!
//! Logging is off unless the effective policy sets `enableLogging`. When it is
//! on, events go to a file opened in append mode; a file that cannot be
//! opened leaves logging off without failing the invocation.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use sshgate_policy::Policy;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter directives for the log file, in `EnvFilter` syntax.
pub const LOG_FILTER_ENV: &str = "SSHGATE_LOG";

/// Log file created in the home directory when `logFile` is unset or unusable.
pub const DEFAULT_LOG_FILE: &str = "sshgate.log";

/// Target of the one-line-per-decision audit events.
pub const AUDIT_TARGET: &str = "sshgate::audit";

/// Keeps the background log writer alive; dropping it flushes pending lines.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Install the file logger described by `policy`.
///
/// Returns `None` when logging is disabled or no log file could be opened.
pub fn init_logging(policy: &Policy) -> Option<LogGuard> {
    if !policy.logging_enabled() {
        return None;
    }

    let home = dirs::home_dir();
    let file = open_log_file(policy.log_file().map(Path::new), home.as_deref())?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    Some(LogGuard { _guard: guard })
}

/// Open `configured`, falling back to `<home>/sshgate.log`.
fn open_log_file(configured: Option<&Path>, home: Option<&Path>) -> Option<File> {
    let fallback: Option<PathBuf> = home.map(|h| h.join(DEFAULT_LOG_FILE));
    configured
        .into_iter()
        .chain(fallback.as_deref())
        .find_map(|path| open_append(path).ok())
}

fn open_append(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o640);
    }
    options.open(path)
}
