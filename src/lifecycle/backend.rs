//! Seam between a container and the HTTP server it drives.

use async_trait::async_trait;

use crate::lifecycle::settings::ContainerSettings;

/// Opaque error raised by a server backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Starts HTTP servers for a container.
#[async_trait]
pub trait ServerBackend: Send + Sync {
    /// Bind and start serving according to `settings`.
    ///
    /// Returns once the server accepts connections.
    async fn start(&self, settings: &ContainerSettings) -> Result<Box<dyn RunningServer>, BoxError>;
}

/// A server started by a [`ServerBackend`].
#[async_trait]
pub trait RunningServer: Send {
    /// Stop accepting connections and release the socket.
    async fn stop(&mut self) -> Result<(), BoxError>;
}
