use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use filexfer::config::{Args, Config, ConfigError};
use filexfer::server;

/// Exit status for a port number below 1024.
const EXIT_PRIVILEGED_PORT: u8 = 255;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    server::init_tracing();

    let config = match Config::try_from(args) {
        Ok(config) => config,
        Err(e @ ConfigError::PrivilegedPort(_)) => {
            error!("{}", e);
            return ExitCode::from(EXIT_PRIVILEGED_PORT);
        }
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Shutting down: {}", e);
            ExitCode::FAILURE
        }
    }
}
