//! HTTP server backend built on axum.
//!
//! # Responsibilities
//! - Build the axum Router for a container (resources, static files, context path)
//! - Wire up middleware (tracing, request timeout)
//! - Bind the listener and serve until stopped
//! - Graceful stop with a bounded wait

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::resources::ResourceCatalog;
use crate::lifecycle::backend::{BoxError, RunningServer, ServerBackend};
use crate::lifecycle::fault::catch_panic;
use crate::lifecycle::settings::{ContainerSettings, DEFAULT_CONTEXT_PATH};
use crate::lifecycle::shutdown::StopSignal;

/// Longest wait for in-flight requests when stopping.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend serving a [`ResourceCatalog`] with axum.
#[derive(Debug, Clone)]
pub struct AxumBackend {
    catalog: ResourceCatalog,
    bind_host: IpAddr,
}

impl AxumBackend {
    /// Serve `catalog` on all IPv4 interfaces.
    pub fn new(catalog: ResourceCatalog) -> Self {
        Self {
            catalog,
            bind_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }

    pub fn with_bind_host(mut self, host: IpAddr) -> Self {
        self.bind_host = host;
        self
    }
}

/// Build the router for one container.
///
/// Invalid context paths and overlapping routes between resource groups are
/// reported as errors.
pub fn build_router(catalog: &ResourceCatalog, settings: &ContainerSettings) -> Result<Router, BoxError> {
    if let Some(segment) = settings
        .context_path
        .split('/')
        .find(|segment| segment.starts_with(':') || segment.contains(['{', '}', '*']))
    {
        return Err(format!(
            "invalid context path {}: segment {:?} is route syntax",
            settings.context_path, segment
        )
        .into());
    }

    let app = catch_panic(|| assemble_router(catalog, settings))
        .map_err(|message| format!("cannot assemble routes: {}", message))?;

    Ok(app.layer(TraceLayer::new_for_http()))
}

fn assemble_router(catalog: &ResourceCatalog, settings: &ContainerSettings) -> Router {
    let (mut app, mounted) = catalog.mount(&settings.resource_groups);

    if let Some(root) = &settings.static_root {
        if !root.is_dir() {
            tracing::warn!(path = %root.display(), "Static resource path is not a directory");
        }
        app = app.fallback_service(ServeDir::new(root));
    } else if mounted == 0 {
        tracing::warn!("No resources mounted and no static path, nothing will be served");
    }

    let mut app = if settings.context_path == DEFAULT_CONTEXT_PATH {
        app
    } else {
        Router::new().nest(&settings.context_path, app)
    };

    if let Some(timeout) = settings.request_timeout {
        app = app.layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout));
    }
    app
}

#[async_trait]
impl ServerBackend for AxumBackend {
    async fn start(&self, settings: &ContainerSettings) -> Result<Box<dyn RunningServer>, BoxError> {
        let app = build_router(&self.catalog, settings)?;

        let listener = TcpListener::bind(SocketAddr::new(self.bind_host, settings.port)).await?;
        let local_addr = listener.local_addr()?;

        let stop = StopSignal::new();
        let mut stopped = stop.subscribe();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stopped.recv().await;
                })
                .await
        });

        tracing::info!(
            address = %local_addr,
            context_path = %settings.context_path,
            "HTTP server listening"
        );

        Ok(Box::new(AxumServer {
            local_addr,
            stop,
            task: Some(task),
        }))
    }
}

/// A running axum server.
pub struct AxumServer {
    local_addr: SocketAddr,
    stop: StopSignal,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl AxumServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl RunningServer for AxumServer {
    async fn stop(&mut self) -> Result<(), BoxError> {
        self.stop.trigger();
        let Some(mut task) = self.task.take() else {
            return Ok(());
        };

        match tokio::time::timeout(STOP_TIMEOUT, &mut task).await {
            Ok(Ok(result)) => {
                tracing::info!(address = %self.local_addr, "HTTP server stopped");
                result.map_err(BoxError::from)
            }
            Ok(Err(e)) => Err(BoxError::from(e)),
            Err(_) => {
                task.abort();
                Err(format!(
                    "server on {} did not stop within {:?}",
                    self.local_addr, STOP_TIMEOUT
                )
                .into())
            }
        }
    }
}

impl Drop for AxumServer {
    fn drop(&mut self) {
        self.stop.trigger();
    }
}
