//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config, provider, lifecycle, http
//!     → tracing events (structured fields)
//!     → logging.rs subscriber
//!     → log file (always, size-rotated, 7 backups) + stderr (--console)
//! ```
//!
//! # Event levels
//! - info: container start/stop with base address and parameters
//! - warn: ignored or missing parameter values
//! - error: start/stop failures with cause; `fatal = true` for uncaught faults

pub mod logging;

pub use logging::{init_logging, LoggingError};
