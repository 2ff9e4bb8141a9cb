//! Executable lookup through the search path.

use std::ffi::OsString;
use std::path::PathBuf;

/// Resolves a program name the way a shell would before executing it.
pub trait ExecutableResolver {
    /// Absolute path of `name`, or `None` when it cannot be found.
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

impl<R: ExecutableResolver + ?Sized> ExecutableResolver for &R {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        (**self).resolve(name)
    }
}

/// Lookup against a `PATH`-style list of directories.
#[derive(Debug, Clone)]
pub struct SearchPath {
    paths: Option<OsString>,
    cwd: PathBuf,
}

impl SearchPath {
    /// Use the process `PATH` and working directory.
    pub fn from_env() -> Self {
        Self {
            paths: std::env::var_os("PATH"),
            cwd: std::env::current_dir().unwrap_or_default(),
        }
    }

    /// Use an explicit `PATH` value.
    pub fn new(paths: impl Into<OsString>) -> Self {
        Self {
            paths: Some(paths.into()),
            cwd: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ExecutableResolver for SearchPath {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        which::which_in(name, self.paths.as_ref(), &self.cwd).ok()
    }
}
