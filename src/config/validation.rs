//! Configuration validation.
//!
//! # Responsibilities
//! - Check the listening port range
//! - Resolve the log file and check that it can be appended to
//!
//! # Design Decisions
//! - Checks are pure functions over the candidate value
//! - A failed check never touches the configuration it was meant for

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::config::loader::ConfigError;

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "simpleWebServer.log";

/// Ports up to and including this value are refused.
pub const MIN_PORT_EXCLUSIVE: u32 = 1000;

/// Highest valid port.
pub const MAX_PORT: u32 = 65535;

/// Validate a port number, returning it narrowed to `u16`.
pub fn validate_port(port: u32) -> Result<u16, ConfigError> {
    if port <= MIN_PORT_EXCLUSIVE || port > MAX_PORT {
        return Err(ConfigError::InvalidPort(port));
    }
    u16::try_from(port).map_err(|_| ConfigError::InvalidPort(port))
}

/// Resolve the log file path and check it.
///
/// `None` falls back to [`DEFAULT_LOG_FILE`]. The resolved path must either not
/// exist yet or be a regular file that can be opened for appending.
pub fn resolve_log_file(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    if !path.exists() {
        return Ok(path);
    }

    if !path.is_file() {
        return Err(ConfigError::InvalidLogPath {
            path,
            reason: "not a regular file",
        });
    }

    // Opening for append does not modify the file.
    if OpenOptions::new().append(true).open(&path).is_err() {
        return Err(ConfigError::InvalidLogPath {
            path,
            reason: "not writable",
        });
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_bounds() {
        assert!(matches!(validate_port(0), Err(ConfigError::InvalidPort(0))));
        assert!(matches!(validate_port(1000), Err(ConfigError::InvalidPort(1000))));
        assert!(matches!(validate_port(65536), Err(ConfigError::InvalidPort(65536))));
        assert!(matches!(validate_port(u32::MAX), Err(ConfigError::InvalidPort(_))));

        assert_eq!(validate_port(1001).unwrap(), 1001);
        assert_eq!(validate_port(8080).unwrap(), 8080);
        assert_eq!(validate_port(65535).unwrap(), 65535);
    }

    #[test]
    fn missing_log_file_falls_back_to_default() {
        let path = resolve_log_file(None).unwrap();
        assert_eq!(path, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn nonexistent_log_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");
        assert_eq!(resolve_log_file(Some(&path)).unwrap(), path);
    }

    #[test]
    fn existing_writable_log_file_is_accepted() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(resolve_log_file(Some(file.path())).unwrap(), file.path());
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_log_file(Some(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogPath { .. }));
    }
}
