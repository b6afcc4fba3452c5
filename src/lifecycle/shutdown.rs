//! Shutdown coordination.
//!
//! [`StopSignal`] tells one running server to stop; [`ShutdownCoordinator`]
//! takes every registered container down when the process terminates.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

use crate::lifecycle::container::ContainerError;
use crate::lifecycle::fault::{Fault, FaultBoundary, FATAL_EXIT_CODE};
use crate::lifecycle::registry::ContainerRegistry;

/// One-shot stop notification for a running server.
pub struct StopSignal {
    tx: broadcast::Sender<()>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe before spawning the task that waits for the signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Why the process is going down.
#[derive(Debug)]
pub enum Termination {
    /// SIGINT/SIGTERM or another orderly request.
    Signal,
    /// A panic reported by the fault boundary.
    Fault(Fault),
}

impl Termination {
    /// Process exit status for this termination.
    pub fn exit_status(&self) -> u8 {
        match self {
            Termination::Signal => 0,
            Termination::Fault(_) => FATAL_EXIT_CODE,
        }
    }
}

/// Outcome of a coordinated shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub stopped: usize,
    pub failed: usize,
}

/// Stops every registered container exactly once.
pub struct ShutdownCoordinator {
    registry: ContainerRegistry,
    completed: AtomicBool,
}

impl ShutdownCoordinator {
    pub fn new(registry: ContainerRegistry) -> Self {
        Self {
            registry,
            completed: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &ContainerRegistry {
        &self.registry
    }

    /// Bring all registered containers up.
    pub async fn start_all(&self) -> Result<(), ContainerError> {
        self.registry.up_all().await
    }

    /// Take every container down.
    ///
    /// Failures are logged per container and do not keep the remaining
    /// containers running. Only the first call does any work.
    pub async fn shutdown_all(&self) -> ShutdownReport {
        if self.completed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Containers already shut down");
            return ShutdownReport::default();
        }

        tracing::debug!(containers = self.registry.len(), "Shutting down all containers");

        let mut report = ShutdownReport::default();
        for container in self.registry.iter() {
            match container.down().await {
                Ok(()) => report.stopped += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        container = %container,
                        error = %e,
                        "Could not shut down web service container"
                    );
                }
            }
        }

        tracing::info!(stopped = report.stopped, failed = report.failed, "Shutdown complete");
        report
    }

    /// Wait for `signal` or a fault, then shut everything down.
    pub async fn run_until_terminated<S>(&self, signal: S, faults: &mut FaultBoundary) -> Termination
    where
        S: Future<Output = ()>,
    {
        let termination = tokio::select! {
            _ = signal => Termination::Signal,
            fault = faults.next_fault() => Termination::Fault(fault),
        };

        tracing::info!(reason = ?termination, "Termination requested");
        self.shutdown_all().await;
        termination
    }
}
