//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line
//!     → cli.rs (parse flags)
//!     → server.rs (ServerConfig, validated on every mutation)
//!     → copied once per container
//!
//! parameter file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → provider (overrides the container's parameters)
//! ```
//!
//! # Design Decisions
//! - Invalid port or log file rejects the operation, nothing is partially applied
//! - Empty parameter keys/values are refused quietly, not as errors
//! - Copies are deep so containers never share a parameter map

pub mod loader;
pub mod params;
pub mod server;
pub mod validation;

pub use loader::{load_params, ConfigError};
pub use params::{
    ParamUpdate, ServerParams, PARAM_IDLE_THREAD_TIMEOUT, PARAM_RESOURCE_PACKAGES,
    PARAM_SERVLET_CONTEXT, PARAM_STATIC_RESOURCE_PATH,
};
pub use server::{ServerConfig, DEFAULT_PORT};
pub use validation::DEFAULT_LOG_FILE;
