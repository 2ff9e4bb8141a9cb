//! Locating and loading the policy file.

use std::io;
use std::path::{Path, PathBuf};

use sshgate_policy::Policy;
use thiserror::Error;
use tracing::debug;

/// File name looked up in the home and working directories.
pub const CONFIG_FILE_NAME: &str = "sshgate.yml";

/// Errors raised while loading the policy.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("did not find any config file (searched {searched})")]
    NotFound { searched: String },

    #[error("cannot read config file `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse config file `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Pick the policy file.
///
/// Candidates in order: `explicit` (from `--config` or the environment),
/// `<home>/sshgate.yml`, then `<cwd>/sshgate.yml`. The first existing file
/// wins; a missing explicit path is not an error by itself.
pub fn locate_config(
    explicit: Option<&Path>,
    home: Option<&Path>,
    cwd: &Path,
) -> Result<PathBuf, ConfigError> {
    let candidates: Vec<PathBuf> = explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(home.map(|h| h.join(CONFIG_FILE_NAME)))
        .chain(std::iter::once(cwd.join(CONFIG_FILE_NAME)))
        .collect();

    if let Some(found) = candidates.iter().find(|path| path.is_file()) {
        debug!(path = %found.display(), "Using config file");
        return Ok(found.clone());
    }

    Err(ConfigError::NotFound {
        searched: candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// [`locate_config`] against the user's home and the working directory.
pub fn find_config(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir();
    locate_config(explicit, home.as_deref(), Path::new("."))
}

/// Read and parse the policy at `path`. An empty file is an empty policy.
pub fn load_policy(path: &Path) -> Result<Policy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim().is_empty() {
        return Ok(Policy::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit_dir = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let explicit = write_config(&explicit_dir, "showDenied: true\n");
        write_config(&home, "showDenied: false\n");

        let found = locate_config(Some(&explicit), Some(home.path()), Path::new("/nonexistent"))
            .unwrap();
        assert_eq!(found, explicit);
    }

    #[test]
    fn test_missing_explicit_path_falls_back_to_home() {
        let home = TempDir::new().unwrap();
        let in_home = write_config(&home, "");

        let found = locate_config(
            Some(Path::new("/nonexistent/sshgate.yml")),
            Some(home.path()),
            Path::new("/nonexistent"),
        )
        .unwrap();
        assert_eq!(found, in_home);
    }

    #[test]
    fn test_working_directory_is_last_resort() {
        let home = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        let in_cwd = write_config(&cwd, "");

        let found = locate_config(None, Some(home.path()), cwd.path()).unwrap();
        assert_eq!(found, in_cwd);
    }

    #[test]
    fn test_directory_named_like_config_is_skipped() {
        let home = TempDir::new().unwrap();
        std::fs::create_dir(home.path().join(CONFIG_FILE_NAME)).unwrap();
        let cwd = TempDir::new().unwrap();
        let in_cwd = write_config(&cwd, "");

        assert_eq!(locate_config(None, Some(home.path()), cwd.path()).unwrap(), in_cwd);
    }

    #[test]
    fn test_nothing_found() {
        let cwd = TempDir::new().unwrap();
        let err = locate_config(None, None, cwd.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_load_policy() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "showDenied: true\nallowedCmd:\n  - command: ls\n  - command: id\n",
        );
        let policy = load_policy(&path).unwrap();
        assert_eq!(policy.show_denied, Some(true));
        assert_eq!(policy.allowed_command_names(), vec!["ls", "id"]);
    }

    #[test]
    fn test_empty_file_is_empty_policy() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "\n");
        assert_eq!(load_policy(&path).unwrap(), Policy::default());
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "allowedCmd: [\n");
        let err = load_policy(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("cannot parse config file"));
    }

    #[test]
    fn test_wrong_shape_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "allowedCmd: ls\n");
        assert!(matches!(load_policy(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_unreadable_path_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = load_policy(&dir.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
