use std::process::ExitCode;

use clap::Parser;
use petmeme::config::{Config, setup_logging};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = petmeme::cli::CliOptions::parse();

    let _ = setup_logging(cli.debug);

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("Configuration error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = petmeme::jobs::run(&cli.command, &config).await {
        error!("Job failed: {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
