//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from the server configuration
//! - Append to the configured log file through a non-blocking writer
//! - Roll the log file over by size, keeping a fixed number of backups
//! - Mirror events to stderr when console output is enabled
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the level chosen by the debug flag
//! - The file layer has no ANSI colors and carries thread names
//! - Backups are `<log>.1` (newest) to `<log>.7` (oldest)

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ServerConfig;

/// Size at which the log file is rolled over.
pub const MAX_LOG_FILE_BYTES: usize = 10_000 * 1024;

/// Number of rolled-over log files kept.
pub const LOG_FILE_BACKUPS: usize = 7;

/// Error type for logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("logging already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Default filter directives for the given verbosity.
pub fn default_directives(debug: bool) -> &'static str {
    if debug {
        "simple_rest_server=debug,tower_http=debug"
    } else {
        "simple_rest_server=info,tower_http=info"
    }
}

/// Open `path` for appending, rolling over after `max_bytes` and keeping
/// `backups` old files.
pub fn file_appender(
    path: &Path,
    max_bytes: usize,
    backups: usize,
) -> Result<FileRotate<AppendCount>, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(FileRotate::new(
        path,
        AppendCount::new(backups),
        ContentLimit::Bytes(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    ))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped; keep it alive for
/// the lifetime of the process.
pub fn init_logging(config: &ServerConfig) -> Result<WorkerGuard, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config.is_debug())));

    let appender = file_appender(config.log_file(), MAX_LOG_FILE_BYTES, LOG_FILE_BACKUPS)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(writer);

    let console_layer = config
        .is_console()
        .then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn backup(path: &Path, index: usize) -> PathBuf {
        PathBuf::from(format!("{}.{}", path.display(), index))
    }

    #[test]
    fn debug_flag_selects_directives() {
        assert!(default_directives(true).contains("simple_rest_server=debug"));
        assert!(default_directives(false).contains("simple_rest_server=info"));
    }

    #[test]
    fn appender_writes_to_exact_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");

        let mut appender = file_appender(&path, MAX_LOG_FILE_BYTES, LOG_FILE_BACKUPS).unwrap();
        appender.write_all(b"line\n").unwrap();
        appender.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line\n");
        assert!(!backup(&path, 1).exists());
    }

    #[test]
    fn appender_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");
        std::fs::write(&path, "first\n").unwrap();

        let mut appender = file_appender(&path, MAX_LOG_FILE_BYTES, LOG_FILE_BACKUPS).unwrap();
        appender.write_all(b"second\n").unwrap();
        appender.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn appender_rolls_over_by_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");

        let mut appender = file_appender(&path, 64, LOG_FILE_BACKUPS).unwrap();
        for _ in 0..20 {
            appender.write_all(b"0123456789abcdef\n").unwrap();
        }
        appender.flush().unwrap();

        assert!(backup(&path, 1).exists());
        assert!(std::fs::metadata(&path).unwrap().len() <= 64);
        assert!(std::fs::metadata(backup(&path, 1)).unwrap().len() <= 64);
    }

    #[test]
    fn appender_keeps_bounded_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");

        let mut appender = file_appender(&path, 16, LOG_FILE_BACKUPS).unwrap();
        for _ in 0..100 {
            appender.write_all(b"0123456789\n").unwrap();
        }
        appender.flush().unwrap();

        assert!(backup(&path, LOG_FILE_BACKUPS).exists());
        assert!(!backup(&path, LOG_FILE_BACKUPS + 1).exists());
    }

    #[test]
    fn unopenable_log_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = file_appender(dir.path(), 1024, 1).err().unwrap();
        assert!(matches!(err, LoggingError::Open { .. }));
    }
}
