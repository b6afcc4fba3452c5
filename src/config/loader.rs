//! Server parameter loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::config::params::ServerParams;

/// Error type for configuration construction and loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("port out of range: {0} (expected 1001..=65535)")]
    InvalidPort(u32),

    #[error("log file {}: {reason}", path.display())]
    InvalidLogPath { path: PathBuf, reason: &'static str },

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// On-disk layout of a parameter file.
///
/// ```toml
/// [params]
/// "de.cismet.commons.simplerestserver.servletContextPath" = "/api"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParamsFile {
    params: ServerParams,
}

/// Load server parameters from a TOML file.
pub fn load_params(path: &Path) -> Result<ServerParams, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_params(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_params(content: &str) -> Result<ServerParams, toml::de::Error> {
    let file: ParamsFile = toml::from_str(content)?;
    Ok(file.params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_params_table() {
        let params = parse_params(
            r#"
            [params]
            "de.cismet.commons.simplerestserver.servletContextPath" = "/api"
            other = "value"
            "#,
        )
        .unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("de.cismet.commons.simplerestserver.servletContextPath"), Some("/api"));
        assert_eq!(params.get("other"), Some("value"));
    }

    #[test]
    fn missing_table_yields_empty_params() {
        assert!(parse_params("").unwrap().is_empty());
    }

    #[test]
    fn non_string_values_are_rejected() {
        assert!(parse_params("[params]\ntimeout = 10\n").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_params(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
