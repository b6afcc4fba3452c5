//! Process-wide fault boundary.
//!
//! Installs a panic hook once at process entry. The hook keeps the previous
//! hook's output and, once the boundary is armed after startup, logs every
//! panic at the highest severity and reports it to the owner of the
//! [`FaultBoundary`], which takes the containers down and exits with
//! [`FATAL_EXIT_CODE`]. Panics before arming are startup failures and are
//! only logged.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;

/// Exit status after an uncaught fault.
pub const FATAL_EXIT_CODE: u8 = 2;

thread_local! {
    static CATCHING: Cell<bool> = const { Cell::new(false) };
}

/// An uncaught panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub thread: String,
    pub message: String,
    pub location: Option<String>,
}

impl Fault {
    pub fn new(thread: impl Into<String>, message: impl Into<String>, location: Option<String>) -> Self {
        Self {
            thread: thread.into(),
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uncaught fault in thread '{}': {}", self.thread, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        Ok(())
    }
}

/// Extract the message of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run `f`, turning a panic into an error message.
///
/// Panics caught here never reach the fault boundary.
pub fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    let outer = CATCHING.with(|c| c.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CATCHING.with(|c| c.set(outer));
    result.map_err(|payload| panic_message(payload.as_ref()))
}

/// Sending half, held by the panic hook.
#[derive(Clone)]
pub struct FaultReporter {
    tx: mpsc::UnboundedSender<Fault>,
    armed: Arc<AtomicBool>,
}

impl FaultReporter {
    pub fn report(&self, fault: Fault) {
        let location = fault.location.as_deref().unwrap_or("unknown");
        if !self.armed.load(Ordering::SeqCst) {
            tracing::error!(
                thread = %fault.thread,
                location,
                message = %fault.message,
                "Panic during startup"
            );
            return;
        }

        tracing::error!(
            fatal = true,
            thread = %fault.thread,
            location,
            message = %fault.message,
            "Caught uncaught fault"
        );
        let _ = self.tx.send(fault);
    }
}

/// Receiving half, held by the process entry point.
pub struct FaultBoundary {
    rx: mpsc::UnboundedReceiver<Fault>,
    armed: Arc<AtomicBool>,
}

impl FaultBoundary {
    /// Create an unarmed reporter/boundary pair without touching the panic hook.
    pub fn channel() -> (FaultReporter, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let armed = Arc::new(AtomicBool::new(false));
        (
            FaultReporter {
                tx,
                armed: armed.clone(),
            },
            Self { rx, armed },
        )
    }

    /// Chain a reporting hook in front of the current process panic hook.
    pub fn install() -> Self {
        let (reporter, boundary) = Self::channel();
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CATCHING.try_with(Cell::get).unwrap_or(false) {
                return;
            }
            previous(info);

            let current = thread::current();
            reporter.report(Fault::new(
                current.name().unwrap_or("<unnamed>"),
                panic_message(info.payload()),
                info.location().map(|l| format!("{}:{}", l.file(), l.line())),
            ));
        }));
        tracing::debug!("Fault boundary installed");
        boundary
    }

    /// From now on panics are fatal faults.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Wait for the next fault.
    pub async fn next_fault(&mut self) -> Fault {
        match self.rx.recv().await {
            Some(fault) => fault,
            // No reporter left; nothing can fault through this boundary anymore.
            None => std::future::pending().await,
        }
    }
}
