//! Error types shared by the repository client, the reviewing agent, and the
//! orchestration pipeline.

use thiserror::Error;

/// Errors surfaced while talking to Bitbucket, invoking the reviewing agent,
/// or preparing a review run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// No repository credential could be resolved from configuration or the
    /// environment.
    #[error("BITBUCKET_ACCESS_TOKEN is not set")]
    MissingToken,

    /// The repository service rejected the credential.
    #[error("Bitbucket rejected the token: {message}")]
    Authentication {
        /// Error detail returned with the 401/403 response.
        message: String,
    },

    /// The repository service answered with a non-success status or a body
    /// that could not be decoded.
    #[error("Bitbucket API error: {message}")]
    Upstream {
        /// HTTP status when the failure came from a response status.
        status: Option<u16>,
        /// Response detail describing the failure.
        message: String,
    },

    /// Networking failed while calling a remote service.
    #[error("network error: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The reviewing agent failed or returned an unusable result.
    #[error("reviewing agent error: {message}")]
    Agent {
        /// Details about the agent failure.
        message: String,
    },

    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// The provided URL could not be parsed.
    #[error("pull request URL is invalid: {0}")]
    InvalidUrl(String),

    /// The pull request URL path is incomplete.
    #[error("pull request URL must match /workspace/repository/pull-requests/<number>")]
    MissingPathSegments,

    /// The pull request number is not a positive integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// A workspace or repository name was blank or malformed.
    #[error("invalid pull request identity: {message}")]
    InvalidIdentity {
        /// Description of the invalid component.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}

/// Shortens `message` to `max_chars` characters, marking the cut with `...`.
pub(crate) fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output: String = message.chars().take(max_chars).collect();
    if message.chars().nth(max_chars).is_some() {
        output.push_str("...");
    }
    output
}
