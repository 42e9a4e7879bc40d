//! Runs one review from resolved configuration.

use std::io;

use pr_reviewer::{ReviewError, ReviewerConfig, review_pull_request};
use tracing::debug;

use super::output::write_outcome_to;

/// Resolves the target and instruction, reviews, and prints the result.
///
/// # Errors
///
/// Returns configuration errors before any request is made, then any
/// pipeline or output failure.
pub async fn run(config: &ReviewerConfig) -> Result<(), ReviewError> {
    let identity = config.resolve_identity()?;
    let instruction = config.resolve_instruction()?;
    let options = config.run_options();
    debug!(%identity, dry_run = options.dry_run, "starting review");

    let outcome = review_pull_request(config, &identity, &instruction, options).await?;

    let mut stdout = io::stdout().lock();
    write_outcome_to(&mut stdout, &identity, &outcome)
}
