//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn the command line into a validated configuration
//! - Initialize logging, then install the signal handlers and fault boundary
//! - Discover the parameter provider and build the containers
//! - Bring containers up and wait for termination
//!
//! # Design Decisions
//! - Both process hooks are in place before any container comes up
//! - Fail fast: any startup error prints usage and exits with status 1
//! - Containers already up when startup fails are taken down first
//! - A signal during startup lets the start settle, then shuts down
//! - A fault after startup exits with status 2

use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;

use crate::cli::{print_usage, Cli, USAGE_EXIT_CODE};
use crate::config::{ConfigError, ServerConfig};
use crate::http::{AxumBackend, ResourceCatalog};
use crate::lifecycle::container::{ContainerError, RestContainer};
use crate::lifecycle::fault::FaultBoundary;
use crate::lifecycle::registry::ContainerRegistry;
use crate::lifecycle::shutdown::{ShutdownCoordinator, Termination};
use crate::lifecycle::signals::TerminationListener;
use crate::observability::logging::{init_logging, LoggingError};
use crate::provider::{ServerParamProvider, TomlParamProvider};

/// Name of the REST container role.
pub const REST_CONTAINER: &str = "rest";

/// Error type for process startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("cannot listen for termination signals: {0}")]
    Signals(#[source] std::io::Error),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("startup panicked: {0}")]
    Panicked(String),
}

/// How bringing the containers up ended.
#[derive(Debug)]
pub enum StartOutcome {
    Started,
    /// A termination signal arrived first; the start was allowed to settle.
    Interrupted,
    Failed(StartupError),
}

/// Build the registry: one REST container on a copy of `config`.
pub fn build_registry(
    config: &ServerConfig,
    provider: Option<&dyn ServerParamProvider>,
    catalog: ResourceCatalog,
) -> Result<ContainerRegistry, ContainerError> {
    let mut registry = ContainerRegistry::new();
    let rest = RestContainer::new(
        REST_CONTAINER,
        config.copy(),
        provider,
        Arc::new(AxumBackend::new(catalog)),
    )?;
    registry.register(Arc::new(rest));
    Ok(registry)
}

/// Run the server process until it is told to stop.
pub async fn run(cli: Cli, catalog: ResourceCatalog) -> ExitCode {
    let config = match cli.to_config() {
        Ok(config) => config,
        Err(e) => return startup_failure(&StartupError::from(e)),
    };

    let _log_guard = match init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => return startup_failure(&StartupError::from(e)),
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port(),
        log_file = %config.log_file().display(),
        debug = config.is_debug(),
        console = config.is_console(),
        "simple-rest-server starting"
    );

    let mut signals = match TerminationListener::install() {
        Ok(listener) => listener,
        Err(e) => return startup_failure(&StartupError::Signals(e)),
    };
    let mut faults = FaultBoundary::install();

    let coordinator = match prepare(&config, catalog) {
        Ok(registry) => Arc::new(ShutdownCoordinator::new(registry)),
        Err(e) => return startup_failure(&e),
    };

    match start_containers(&coordinator, signals.recv()).await {
        StartOutcome::Started => {}
        StartOutcome::Interrupted => {
            coordinator.shutdown_all().await;
            return ExitCode::SUCCESS;
        }
        StartOutcome::Failed(e) => {
            tracing::error!(error = %e, "Startup failed");
            coordinator.shutdown_all().await;
            return startup_failure(&e);
        }
    }

    faults.arm();
    let termination = coordinator
        .run_until_terminated(signals.recv(), &mut faults)
        .await;
    if let Termination::Fault(fault) = &termination {
        tracing::error!(fatal = true, %fault, "Terminating after uncaught fault");
    }
    ExitCode::from(termination.exit_status())
}

fn prepare(config: &ServerConfig, catalog: ResourceCatalog) -> Result<ContainerRegistry, StartupError> {
    let provider = TomlParamProvider::discover()?;
    match &provider {
        Some(p) => tracing::info!(path = %p.path().display(), "Found parameter provider"),
        None => tracing::debug!("No parameter provider, using configured parameters"),
    }
    let provider = provider.as_ref().map(|p| p as &dyn ServerParamProvider);
    Ok(build_registry(config, provider, catalog)?)
}

/// Bring all containers up unless `signal` resolves first.
///
/// Containers come up on a separate task so a panic there is a startup
/// failure. When interrupted, the task is awaited so that no container
/// finishes coming up after the caller has shut everything down.
pub async fn start_containers<S>(coordinator: &Arc<ShutdownCoordinator>, signal: S) -> StartOutcome
where
    S: Future<Output = ()>,
{
    let starter = Arc::clone(coordinator);
    let mut task = tokio::spawn(async move { starter.start_all().await });

    tokio::select! {
        joined = &mut task => match joined {
            Ok(Ok(())) => StartOutcome::Started,
            Ok(Err(e)) => StartOutcome::Failed(e.into()),
            Err(e) => StartOutcome::Failed(StartupError::Panicked(e.to_string())),
        },
        _ = signal => {
            tracing::info!("Termination requested during startup");
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Container start panicked after termination request");
            }
            StartOutcome::Interrupted
        }
    }
}

fn startup_failure(error: &StartupError) -> ExitCode {
    eprintln!("Illegal option value or startup failure: {}", error);
    print_usage();
    ExitCode::from(USAGE_EXIT_CODE)
}
