//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! ContainerSettings
//!     → resources.rs (pick resource groups from the catalog)
//!     → server.rs (static files, context path, timeout, tracing)
//!     → axum::serve on the container's port
//!     → stopped through StopSignal on down()
//! ```

pub mod resources;
pub mod server;

pub use resources::ResourceCatalog;
pub use server::{build_router, AxumBackend, AxumServer, STOP_TIMEOUT};
