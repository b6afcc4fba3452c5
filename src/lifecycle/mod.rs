//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     CLI → ServerConfig → logging → fault boundary → containers → up()
//!
//! Container (container.rs):
//!     up(): resolve params → settings.rs → backend.rs start → Running
//!     down(): stop server → Stopped (even if stop fails)
//!
//! Shutdown (shutdown.rs):
//!     Signal (signals.rs, registered before startup) or fault (fault.rs, armed
//!     after startup) → down() on every registered container
//! ```
//!
//! # Design Decisions
//! - One lock per container serializes up()/down()
//! - Registry is an owned value handed to the coordinator, not a global
//! - Shutdown failures are logged per container, never propagated

pub mod backend;
pub mod container;
pub mod fault;
pub mod registry;
pub mod settings;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use backend::{BoxError, RunningServer, ServerBackend};
pub use container::{ContainerError, ContainerState, RestContainer, WebServiceContainer};
pub use fault::{catch_panic, Fault, FaultBoundary, FaultReporter, FATAL_EXIT_CODE};
pub use registry::ContainerRegistry;
pub use settings::ContainerSettings;
pub use shutdown::{ShutdownCoordinator, ShutdownReport, StopSignal, Termination};
pub use signals::TerminationListener;
pub use startup::{StartOutcome, StartupError};
