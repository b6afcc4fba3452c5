//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and, on unix, SIGTERM both request an orderly shutdown.
//! Handlers are registered when the listener is installed, so a signal that
//! arrives before anyone waits on it is still delivered.

use std::io;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Registered termination signal handlers.
pub struct TerminationListener {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl TerminationListener {
    /// Replace the default signal disposition with our handlers.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(windows)]
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    /// Resolve once a termination signal arrives.
    #[cfg(unix)]
    pub async fn recv(&mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => tracing::info!(signal = "SIGINT", "Shutdown signal received"),
            _ = self.terminate.recv() => tracing::info!(signal = "SIGTERM", "Shutdown signal received"),
        }
    }

    #[cfg(windows)]
    pub async fn recv(&mut self) {
        self.ctrl_c.recv().await;
        tracing::info!(signal = "CTRL_C", "Shutdown signal received");
    }
}
