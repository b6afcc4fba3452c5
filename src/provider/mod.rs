//! Server parameter providers and resolution.
//!
//! # Data Flow
//! ```text
//! provider discovered (zero or one)
//!     → queried once when a container is constructed
//!     → resolve_params(container params, provider answer)
//!     → parameter set handed to the server on every up()
//! ```
//!
//! # Design Decisions
//! - Provider parameters replace the container's set, they are never merged
//! - A missing or empty provider answer keeps the container's own set

pub mod file;

pub use file::{TomlParamProvider, DEFAULT_PARAMS_FILE, PARAMS_FILE_ENV};

use crate::config::ServerParams;

/// An external component that can supply the parameters for a container.
pub trait ServerParamProvider: Send + Sync {
    /// The current parameter mapping, or `None` if the provider has nothing to offer.
    fn server_params(&self) -> Option<ServerParams>;
}

impl ServerParamProvider for ServerParams {
    fn server_params(&self) -> Option<ServerParams> {
        Some(self.clone())
    }
}

/// Decide the parameter set a container runs with.
///
/// A present, non-empty provider set replaces `base` entirely. Otherwise
/// `base` is returned unchanged.
pub fn resolve_params(base: &ServerParams, provided: Option<&ServerParams>) -> ServerParams {
    match provided {
        Some(provided) if !provided.is_empty() => {
            tracing::info!(params = %provided, "Using parameters from provider");
            provided.clone()
        }
        _ => {
            if base.is_empty() {
                tracing::warn!("Server parameters empty, nothing will be served");
            }
            base.clone()
        }
    }
}
