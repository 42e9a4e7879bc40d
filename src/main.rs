//! `pr-reviewer` CLI entrypoint for reviewing a Bitbucket pull request.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use pr_reviewer::telemetry::init_logging;
use pr_reviewer::{ReviewError, ReviewerConfig};

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ReviewError> {
    let config = load_config()?;
    init_logging(config.verbose)?;
    cli::review::run(&config).await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<ReviewerConfig, ReviewError> {
    ReviewerConfig::load().map_err(|error| ReviewError::Configuration {
        message: error.to_string(),
    })
}
