//! Command line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::config::{ConfigError, ServerConfig, DEFAULT_LOG_FILE, DEFAULT_PORT};

/// Exit status for invalid command lines and startup failures.
pub const USAGE_EXIT_CODE: u8 = 1;

#[derive(Debug, Clone, Parser)]
#[command(name = "simple-rest-server")]
#[command(version, about = "Embedded REST web server", long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u32,

    /// Log file, appended to
    #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
    pub logfile: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Also log to the console
    #[arg(short, long)]
    pub console: bool,
}

impl Cli {
    pub fn to_config(&self) -> Result<ServerConfig, ConfigError> {
        ServerConfig::new(self.port, Some(self.logfile.clone()), self.debug, self.console)
    }
}

pub fn print_usage() {
    let _ = Cli::command().print_help();
}

/// Report a command line parse error and pick the exit status.
///
/// `--help` and `--version` exit successfully.
pub fn parse_error_exit(err: clap::Error) -> ExitCode {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => {
            print_usage();
            ExitCode::from(USAGE_EXIT_CODE)
        }
    }
}
