//! Server settings derived from a resolved parameter set.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::config::{
    ServerParams, PARAM_IDLE_THREAD_TIMEOUT, PARAM_RESOURCE_PACKAGES, PARAM_SERVLET_CONTEXT,
    PARAM_STATIC_RESOURCE_PATH,
};

/// Context path used when none is configured.
pub const DEFAULT_CONTEXT_PATH: &str = "/";

/// Everything a backend needs to start one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSettings {
    pub port: u16,
    pub base_address: Url,
    /// Normalized: leading slash, no trailing slash except for the root.
    pub context_path: String,
    pub static_root: Option<PathBuf>,
    pub request_timeout: Option<Duration>,
    /// Resource groups to mount, in the order given.
    pub resource_groups: Vec<String>,
    /// The full resolved parameter set.
    pub params: ServerParams,
}

impl ContainerSettings {
    /// Interpret the recognized keys of `params`.
    ///
    /// Malformed values are logged and ignored; this never fails.
    pub fn from_params(port: u16, base_address: Url, params: ServerParams) -> Self {
        let context_path = match params.get(PARAM_SERVLET_CONTEXT) {
            Some(path) => {
                tracing::debug!(context_path = %path, "Found context path");
                normalize_context_path(path)
            }
            None => {
                tracing::warn!(
                    context_path = DEFAULT_CONTEXT_PATH,
                    "No context path found, using default"
                );
                DEFAULT_CONTEXT_PATH.to_string()
            }
        };

        let static_root = params.get(PARAM_STATIC_RESOURCE_PATH).map(PathBuf::from);
        match &static_root {
            Some(root) => tracing::debug!(path = %root.display(), "Found static resources"),
            None => tracing::debug!("No static resources specified"),
        }

        let request_timeout = params
            .get(PARAM_IDLE_THREAD_TIMEOUT)
            .and_then(parse_timeout);

        let resource_groups = params
            .get(PARAM_RESOURCE_PACKAGES)
            .map(split_groups)
            .unwrap_or_default();

        Self {
            port,
            base_address,
            context_path,
            static_root,
            request_timeout,
            resource_groups,
            params,
        }
    }
}

fn normalize_context_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        DEFAULT_CONTEXT_PATH.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(millis) => Some(Duration::from_millis(millis)),
        Err(_) => {
            tracing::warn!(value = %raw, "Idle thread timeout is not a number, ignored");
            None
        }
    }
}

/// Split a group list, keeping the first occurrence of repeated names.
fn split_groups(raw: &str) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for name in raw.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        if name.is_empty() || groups.iter().any(|g| g == name) {
            continue;
        }
        groups.push(name.to_string());
    }
    groups
}
