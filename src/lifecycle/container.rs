//! REST container lifecycle.
//!
//! A container owns its configuration and at most one running server.
//! `up()` and `down()` are serialized by a per-container lock and are both
//! idempotent:
//!
//! ```text
//!            up() ok
//! Stopped ───────────▶ Running
//!    ▲  ◀──────────────  │
//!    │   down() (always)  │
//!    └─ up() fails        └─ up() no-op
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

use crate::config::{ServerConfig, ServerParams};
use crate::lifecycle::backend::{BoxError, RunningServer, ServerBackend};
use crate::lifecycle::settings::ContainerSettings;
use crate::provider::{resolve_params, ServerParamProvider};

/// Scheme of every base address.
pub const DEFAULT_PROTOCOL: &str = "http";

/// Host of every base address.
pub const DEFAULT_HOST: &str = "localhost";

/// Error type for container lifecycle operations.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("base address cannot be constructed for port {port}: {source}")]
    InvalidAddress { port: u16, source: url::ParseError },

    #[error("could not start container at {address}: {source}")]
    StartFailure { address: Url, source: BoxError },

    #[error("could not stop container at {address}: {source}")]
    StopFailure { address: Url, source: BoxError },
}

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Stopped,
    Running,
}

/// A unit that owns one HTTP listener and its REST configuration.
#[async_trait]
pub trait WebServiceContainer: Send + Sync + fmt::Display {
    /// Start serving. No-op when already running.
    async fn up(&self) -> Result<(), ContainerError>;

    /// Stop serving. No-op when already stopped; always ends stopped.
    async fn down(&self) -> Result<(), ContainerError>;

    async fn state(&self) -> ContainerState;

    fn base_address(&self) -> &Url;
}

/// Build `http://localhost:<port>/`.
pub fn base_address_for(port: u16) -> Result<Url, ContainerError> {
    let address = format!("{}://{}:{}/", DEFAULT_PROTOCOL, DEFAULT_HOST, port);
    Url::parse(&address).map_err(|source| ContainerError::InvalidAddress { port, source })
}

/// Container exposing REST resources through a [`ServerBackend`].
pub struct RestContainer {
    name: String,
    config: ServerConfig,
    base_address: Url,
    /// Provider answer, taken once at construction.
    provided: Option<ServerParams>,
    backend: Arc<dyn ServerBackend>,
    server: Mutex<Option<ActiveServer>>,
}

/// A started server and the parameter set it was started with.
struct ActiveServer {
    server: Box<dyn RunningServer>,
    params: ServerParams,
}

impl RestContainer {
    /// Create a stopped container.
    ///
    /// `provider` is queried here and never again.
    pub fn new(
        name: impl Into<String>,
        config: ServerConfig,
        provider: Option<&dyn ServerParamProvider>,
        backend: Arc<dyn ServerBackend>,
    ) -> Result<Self, ContainerError> {
        let name = name.into();
        let base_address = base_address_for(config.port())?;
        let provided = provider.and_then(|p| p.server_params());

        tracing::info!(
            container = %name,
            address = %base_address,
            provider = provided.is_some(),
            "Created container"
        );

        Ok(Self {
            name,
            config,
            base_address,
            provided,
            backend,
            server: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Parameters the next `up()` will run with.
    pub fn resolved_params(&self) -> ServerParams {
        resolve_params(self.config.params(), self.provided.as_ref())
    }

    /// Parameters of the running server, if any.
    pub async fn running_params(&self) -> Option<ServerParams> {
        self.server.lock().await.as_ref().map(|active| active.params.clone())
    }
}

#[async_trait]
impl WebServiceContainer for RestContainer {
    async fn up(&self) -> Result<(), ContainerError> {
        let mut server = self.server.lock().await;
        if server.is_some() {
            tracing::debug!(container = %self.name, "Container already running");
            return Ok(());
        }

        let params = self.resolved_params();
        tracing::info!(
            container = %self.name,
            address = %self.base_address,
            params = %params,
            "Container coming up"
        );

        let settings =
            ContainerSettings::from_params(self.config.port(), self.base_address.clone(), params);

        match self.backend.start(&settings).await {
            Ok(running) => {
                *server = Some(ActiveServer {
                    server: running,
                    params: settings.params,
                });
                tracing::info!(container = %self.name, address = %self.base_address, "Container running");
                Ok(())
            }
            Err(source) => {
                tracing::error!(
                    container = %self.name,
                    address = %self.base_address,
                    error = %source,
                    "Could not start container"
                );
                Err(ContainerError::StartFailure {
                    address: self.base_address.clone(),
                    source,
                })
            }
        }
    }

    async fn down(&self) -> Result<(), ContainerError> {
        let mut server = self.server.lock().await;
        // Taken before stopping so the container is stopped whatever stop() returns.
        let Some(mut active) = server.take() else {
            tracing::debug!(container = %self.name, "Container already stopped");
            return Ok(());
        };

        tracing::info!(
            container = %self.name,
            address = %self.base_address,
            params = %active.params,
            "Container coming down"
        );

        let result = active.server.stop().await;
        drop(active);

        match result {
            Ok(()) => {
                tracing::info!(container = %self.name, "Container stopped");
                Ok(())
            }
            Err(source) => Err(ContainerError::StopFailure {
                address: self.base_address.clone(),
                source,
            }),
        }
    }

    async fn state(&self) -> ContainerState {
        if self.server.lock().await.is_some() {
            ContainerState::Running
        } else {
            ContainerState::Stopped
        }
    }

    fn base_address(&self) -> &Url {
        &self.base_address
    }
}

impl fmt::Display for RestContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.name, self.base_address)
    }
}

impl fmt::Debug for RestContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestContainer")
            .field("name", &self.name)
            .field("base_address", &self.base_address.as_str())
            .field("provided", &self.provided.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Backend counting live servers instead of binding sockets.
    #[derive(Default)]
    struct CountingBackend {
        starts: AtomicUsize,
        live: Arc<AtomicUsize>,
        fail_start: AtomicBool,
        fail_stop: bool,
        last_settings: StdMutex<Option<ContainerSettings>>,
    }

    struct CountingServer {
        live: Arc<AtomicUsize>,
        fail_stop: bool,
    }

    #[async_trait]
    impl ServerBackend for CountingBackend {
        async fn start(&self, settings: &ContainerSettings) -> Result<Box<dyn RunningServer>, BoxError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail_start.load(Ordering::SeqCst) {
                return Err("address in use".into());
            }
            self.starts.fetch_add(1, Ordering::SeqCst);
            self.live.fetch_add(1, Ordering::SeqCst);
            *self.last_settings.lock().unwrap() = Some(settings.clone());
            Ok(Box::new(CountingServer {
                live: self.live.clone(),
                fail_stop: self.fail_stop,
            }))
        }
    }

    #[async_trait]
    impl RunningServer for CountingServer {
        async fn stop(&mut self) -> Result<(), BoxError> {
            self.live.fetch_sub(1, Ordering::SeqCst);
            if self.fail_stop {
                return Err("stop failed".into());
            }
            Ok(())
        }
    }

    fn container(backend: Arc<CountingBackend>, provider: Option<&dyn ServerParamProvider>) -> RestContainer {
        let mut config = ServerConfig::with_port(8080).unwrap();
        let _ = config.put_param("a", "1");
        RestContainer::new("rest", config, provider, backend).unwrap()
    }

    #[test]
    fn base_address_has_fixed_form() {
        assert_eq!(base_address_for(8080).unwrap().as_str(), "http://localhost:8080/");
        assert_eq!(base_address_for(65535).unwrap().as_str(), "http://localhost:65535/");
    }

    #[tokio::test]
    async fn up_twice_starts_once() {
        let backend = Arc::new(CountingBackend::default());
        let container = container(backend.clone(), None);

        container.up().await.unwrap();
        container.up().await.unwrap();

        assert_eq!(backend.starts.load(Ordering::SeqCst), 1);
        assert_eq!(backend.live.load(Ordering::SeqCst), 1);
        assert_eq!(container.state().await, ContainerState::Running);
    }

    #[tokio::test]
    async fn concurrent_up_starts_once() {
        let backend = Arc::new(CountingBackend::default());
        let container = container(backend.clone(), None);

        let (a, b) = tokio::join!(container.up(), container.up());
        a.unwrap();
        b.unwrap();

        assert_eq!(backend.starts.load(Ordering::SeqCst), 1);
        assert_eq!(backend.live.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn down_twice_is_safe() {
        let backend = Arc::new(CountingBackend::default());
        let container = container(backend.clone(), None);

        container.up().await.unwrap();
        container.down().await.unwrap();
        container.down().await.unwrap();

        assert_eq!(backend.live.load(Ordering::SeqCst), 0);
        assert_eq!(container.state().await, ContainerState::Stopped);
    }

    #[tokio::test]
    async fn down_before_up_is_noop() {
        let backend = Arc::new(CountingBackend::default());
        let container = container(backend, None);
        container.down().await.unwrap();
        assert_eq!(container.state().await, ContainerState::Stopped);
    }

    #[tokio::test]
    async fn failed_start_stays_stopped_and_can_retry() {
        let backend = Arc::new(CountingBackend::default());
        backend.fail_start.store(true, Ordering::SeqCst);
        let container = container(backend.clone(), None);

        let err = container.up().await.unwrap_err();
        assert!(matches!(err, ContainerError::StartFailure { .. }));
        assert_eq!(container.state().await, ContainerState::Stopped);

        backend.fail_start.store(false, Ordering::SeqCst);
        container.up().await.unwrap();
        assert_eq!(container.state().await, ContainerState::Running);
    }

    #[tokio::test]
    async fn failed_stop_still_ends_stopped() {
        let backend = Arc::new(CountingBackend {
            fail_stop: true,
            ..Default::default()
        });
        let container = container(backend.clone(), None);

        container.up().await.unwrap();
        let err = container.down().await.unwrap_err();
        assert!(matches!(err, ContainerError::StopFailure { .. }));
        assert_eq!(container.state().await, ContainerState::Stopped);

        container.up().await.unwrap();
        assert_eq!(backend.starts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn provider_params_replace_config_params() {
        let backend = Arc::new(CountingBackend::default());
        let provided: ServerParams = [("b", "2")].into_iter().collect();
        let container = container(backend.clone(), Some(&provided));

        container.up().await.unwrap();

        let settings = backend.last_settings.lock().unwrap().clone().unwrap();
        assert_eq!(settings.params, provided);
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.base_address.as_str(), "http://localhost:8080/");
    }

    #[tokio::test]
    async fn running_server_keeps_its_params_until_down() {
        let backend = Arc::new(CountingBackend::default());
        let provided: ServerParams = [("b", "2")].into_iter().collect();
        let container = container(backend, Some(&provided));

        assert_eq!(container.running_params().await, None);
        container.up().await.unwrap();
        assert_eq!(container.running_params().await, Some(provided));

        container.down().await.unwrap();
        assert_eq!(container.running_params().await, None);
    }

    #[tokio::test]
    async fn without_provider_config_params_are_used() {
        let backend = Arc::new(CountingBackend::default());
        let container = container(backend.clone(), None);

        container.up().await.unwrap();

        let settings = backend.last_settings.lock().unwrap().clone().unwrap();
        assert_eq!(settings.params.get("a"), Some("1"));
        assert_eq!(settings.params.len(), 1);
    }

    #[test]
    fn display_names_container_and_address() {
        let backend = Arc::new(CountingBackend::default());
        let container = container(backend, None);
        assert_eq!(container.to_string(), "rest @ http://localhost:8080/");
    }
}
