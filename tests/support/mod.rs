//! Shared test utilities.

use pr_reviewer::ReviewError;

pub mod bitbucket;
pub mod runtime;

/// Builds the error used to fail a step for harness reasons.
pub fn step_error(message: impl Into<String>) -> ReviewError {
    ReviewError::Io {
        message: message.into(),
    }
}
