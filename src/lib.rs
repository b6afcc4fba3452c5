//! Simple REST server bootstrap library.
//!
//! Configures, starts and stops embedded HTTP containers that expose REST
//! resources, and takes them down cleanly when the process terminates.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod provider;

pub use config::{ConfigError, ServerConfig, ServerParams};
pub use http::{AxumBackend, ResourceCatalog};
pub use lifecycle::{
    ContainerError, ContainerRegistry, ContainerState, RestContainer, ShutdownCoordinator,
    WebServiceContainer,
};
pub use provider::{resolve_params, ServerParamProvider};
