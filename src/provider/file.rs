//! File-backed parameter provider.
//!
//! Discovery order:
//! 1. the file named by `SIMPLE_REST_SERVER_PARAMS` (must load if set)
//! 2. `server-params.toml` in the working directory, if present
//! 3. no provider

use std::env;
use std::path::{Path, PathBuf};

use crate::config::{load_params, ConfigError, ServerParams};
use crate::provider::ServerParamProvider;

/// Environment variable naming the parameter file.
pub const PARAMS_FILE_ENV: &str = "SIMPLE_REST_SERVER_PARAMS";

/// Parameter file looked up in the working directory.
pub const DEFAULT_PARAMS_FILE: &str = "server-params.toml";

/// Provider answering with the `[params]` table of a TOML file.
///
/// The file is read once, when the provider is loaded.
#[derive(Debug, Clone)]
pub struct TomlParamProvider {
    path: PathBuf,
    params: ServerParams,
}

impl TomlParamProvider {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let params = load_params(path)?;
        tracing::debug!(path = %path.display(), count = params.len(), "Loaded parameter file");
        Ok(Self {
            path: path.to_path_buf(),
            params,
        })
    }

    /// Find the parameter file through the environment or the working directory.
    pub fn discover() -> Result<Option<Self>, ConfigError> {
        let explicit = env::var_os(PARAMS_FILE_ENV).map(PathBuf::from);
        Self::discover_from(explicit.as_deref(), Path::new(DEFAULT_PARAMS_FILE))
    }

    fn discover_from(explicit: Option<&Path>, fallback: &Path) -> Result<Option<Self>, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path).map(Some);
        }
        if fallback.is_file() {
            return Self::load(fallback).map(Some);
        }
        tracing::debug!("No parameter provider found");
        Ok(None)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ServerParamProvider for TomlParamProvider {
    fn server_params(&self) -> Option<ServerParams> {
        Some(self.params.clone())
    }
}
