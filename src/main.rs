//! Simple REST server.
//!
//! Brings up one REST container on the configured port and keeps it running
//! until SIGINT/SIGTERM.
//!
//! ```text
//! simple-rest-server [-p PORT] [-l LOGFILE] [-d] [-c]
//! ```
//!
//! Container parameters come from `server-params.toml` in the working
//! directory, or the file named by `SIMPLE_REST_SERVER_PARAMS`.

use std::process::ExitCode;

use clap::Parser;

use simple_rest_server::cli::{self, Cli};
use simple_rest_server::lifecycle::startup;
use simple_rest_server::ResourceCatalog;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return cli::parse_error_exit(err),
    };

    startup::run(cli, ResourceCatalog::new()).await
}
