//! Server configuration value.
//!
//! Holds the listening port, log destination, verbosity flags and the
//! parameter set for the embedded REST container. Port and log file rules are
//! checked on every mutation; a failed mutation leaves the old value in place.

use std::path::{Path, PathBuf};

use crate::config::loader::ConfigError;
use crate::config::params::{ParamUpdate, ServerParams};
use crate::config::validation::{resolve_log_file, validate_port};

/// Default listening port.
pub const DEFAULT_PORT: u32 = 9986;

/// Validated configuration for one web server process or container.
///
/// `Clone` is a deep copy: the parameter map and log path are owned, so a
/// clone can be changed without affecting the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    port: u16,
    log_file: PathBuf,
    debug: bool,
    console: bool,
    params: ServerParams,
}

impl ServerConfig {
    /// Create a configuration, failing fast on an invalid port or log file.
    pub fn new(
        port: u32,
        log_file: Option<PathBuf>,
        debug: bool,
        console: bool,
    ) -> Result<Self, ConfigError> {
        let port = validate_port(port)?;
        let log_file = resolve_log_file(log_file.as_deref())?;
        Ok(Self {
            port,
            log_file,
            debug,
            console,
            params: ServerParams::new(),
        })
    }

    /// Create a configuration with the default log file and both flags off.
    pub fn with_port(port: u32) -> Result<Self, ConfigError> {
        Self::new(port, None, false, false)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_port(&mut self, port: u32) -> Result<(), ConfigError> {
        self.port = validate_port(port)?;
        Ok(())
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Replace the log file; `None` selects the default.
    pub fn set_log_file(&mut self, log_file: Option<PathBuf>) -> Result<(), ConfigError> {
        self.log_file = resolve_log_file(log_file.as_deref())?;
        Ok(())
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn is_console(&self) -> bool {
        self.console
    }

    pub fn set_console(&mut self, console: bool) {
        self.console = console;
    }

    pub fn params(&self) -> &ServerParams {
        &self.params
    }

    pub fn put_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> ParamUpdate {
        self.params.put(key, value)
    }

    pub fn remove_param(&mut self, key: &str) -> ParamUpdate {
        self.params.remove(key)
    }

    pub fn clear_params(&mut self) {
        self.params.clear();
    }

    /// Copy all of `params` in, overwriting existing keys. Entries are not validated.
    pub fn put_all_params(&mut self, params: &ServerParams) {
        self.params.extend_from(params);
    }

    /// Independent copy for deriving a per-container configuration.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}
