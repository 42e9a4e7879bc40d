//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.pr-reviewer.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `PR_REVIEWER_PR_URL`, `PR_REVIEWER_TOKEN`,
//!    and so on
//! 4. **Command-line arguments** – `--pr-url`/`-u`, `--token`/`-t`, ...
//!
//! Credentials have one more fallback each: `BITBUCKET_ACCESS_TOKEN` for the
//! repository token (resolved by the client on every request) and
//! `OPENAI_API_KEY` for the agent key.
//!
//! # Configuration File
//!
//! ```toml
//! pr_url = "https://bitbucket.org/acme/widgets/pull-requests/42"
//! ignored_files = "package-lock.json,yarn.lock"
//! comment_language = "English"
//! instruction_file = "REVIEW_GUIDELINES.md"
//! ai_model = "o4-mini"
//! ```

mod instruction_file;

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::agent::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, OpenAiReviewAgentConfig,
};
use crate::bitbucket::gateway::{BitbucketClientConfig, DEFAULT_API_BASE, StatusPolicy};
use crate::bitbucket::locator::{AccessToken, PullRequestIdentity};
use crate::error::ReviewError;
use crate::review::model::{DEFAULT_COMMENT_LANGUAGE, ReviewInstruction, RunOptions};

/// Environment variable consulted when no agent key is configured.
pub const AI_API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use pr_reviewer::ReviewerConfig;
///
/// let config = ReviewerConfig::load().expect("failed to load configuration");
/// let identity = config.resolve_identity().expect("pull request required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PR_REVIEWER",
    discovery(
        dotfile_name = ".pr-reviewer.toml",
        config_file_name = "pr-reviewer.toml",
        app_name = "pr-reviewer"
    )
)]
pub struct ReviewerConfig {
    /// Bitbucket pull request URL to review.
    ///
    /// Can be provided via:
    /// - CLI: `--pr-url <URL>` or `-u <URL>`
    /// - Environment: `PR_REVIEWER_PR_URL`
    /// - Config file: `pr_url = "..."`
    #[ortho_config(cli_short = 'u')]
    pub pr_url: Option<String>,

    /// Bitbucket workspace, used when no URL is given.
    #[ortho_config(cli_short = 'w')]
    pub workspace: Option<String>,

    /// Repository slug, used when no URL is given.
    #[ortho_config(cli_short = 'r')]
    pub repository: Option<String>,

    /// Pull request number, used when no URL is given.
    #[ortho_config(cli_short = 'n')]
    pub pr_number: Option<u64>,

    /// Bitbucket access token.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PR_REVIEWER_TOKEN`, or `BITBUCKET_ACCESS_TOKEN` at
    ///   request time
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Bitbucket REST API base URL.
    #[ortho_config()]
    pub api_base: Option<String>,

    /// Comma-separated file paths excluded from review.
    ///
    /// Each entry is matched exactly against the old and the new path of
    /// every changed file.
    #[ortho_config(cli_short = 'i')]
    pub ignored_files: Option<String>,

    /// Language the review comments are written in. Defaults to English.
    #[ortho_config(cli_short = 'l')]
    pub comment_language: Option<String>,

    /// Inline project review guidelines.
    #[ortho_config()]
    pub instruction: Option<String>,

    /// Path of a file holding the project review guidelines.
    #[ortho_config()]
    pub instruction_file: Option<String>,

    /// Chat-completions API base URL.
    #[ortho_config()]
    pub ai_base_url: Option<String>,

    /// Model used for reviewing.
    #[ortho_config()]
    pub ai_model: Option<String>,

    /// API key for the reviewing model.
    ///
    /// Can be provided via:
    /// - CLI: `--ai-api-key <KEY>`
    /// - Environment: `PR_REVIEWER_AI_API_KEY` or `OPENAI_API_KEY`
    /// - Config file: `ai_api_key = "..."`
    #[ortho_config()]
    pub ai_api_key: Option<String>,

    /// Timeout for one review request, in seconds. Zero selects the default.
    #[ortho_config()]
    pub ai_timeout_seconds: u64,

    /// Prints the proposed comments instead of publishing them.
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment; use `--dry-run` / `-d` or `dry_run = true`.
    #[ortho_config(cli_short = 'd')]
    pub dry_run: bool,

    /// Decodes Bitbucket responses without checking their HTTP status.
    #[ortho_config()]
    pub pass_through_status: bool,

    /// Enables debug logging.
    #[ortho_config(cli_short = 'v')]
    pub verbose: bool,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            pr_url: None,
            workspace: None,
            repository: None,
            pr_number: None,
            token: None,
            api_base: None,
            ignored_files: None,
            comment_language: None,
            instruction: None,
            instruction_file: None,
            ai_base_url: None,
            ai_model: None,
            ai_api_key: None,
            ai_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            dry_run: false,
            pass_through_status: false,
            verbose: false,
        }
    }
}

impl ReviewerConfig {
    /// Resolves the pull request to review.
    ///
    /// A URL wins over the explicit workspace, repository, and number.
    ///
    /// # Errors
    ///
    /// Returns URL parsing errors for a malformed `pr_url`,
    /// [`ReviewError::InvalidIdentity`] or
    /// [`ReviewError::InvalidPullRequestNumber`] for bad explicit parts, and
    /// [`ReviewError::Configuration`] when neither form is complete.
    pub fn resolve_identity(&self) -> Result<PullRequestIdentity, ReviewError> {
        if let Some(url) = self.pr_url.as_deref() {
            return PullRequestIdentity::parse_url(url);
        }

        match (&self.workspace, &self.repository, self.pr_number) {
            (Some(workspace), Some(repository), Some(number)) => {
                PullRequestIdentity::from_parts(workspace, repository, number)
            }
            _ => Err(ReviewError::Configuration {
                message: concat!(
                    "pull request is required (use --pr-url, or --workspace, ",
                    "--repository and --pr-number)"
                )
                .to_owned(),
            }),
        }
    }

    /// Returns the explicitly configured repository token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::MissingToken`] when the configured value is
    /// blank.
    pub fn access_token(&self) -> Result<Option<AccessToken>, ReviewError> {
        self.token.as_deref().map(AccessToken::new).transpose()
    }

    /// Status handling for Bitbucket reads.
    #[must_use]
    pub const fn status_policy(&self) -> StatusPolicy {
        if self.pass_through_status {
            StatusPolicy::PassThrough
        } else {
            StatusPolicy::Strict
        }
    }

    /// Builds the Bitbucket client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::MissingToken`] when the configured token is
    /// blank.
    pub fn client_config(&self) -> Result<BitbucketClientConfig, ReviewError> {
        let api_base = self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        Ok(BitbucketClientConfig::new(api_base, self.access_token()?)
            .with_status_policy(self.status_policy()))
    }

    /// Builds the reviewing agent configuration, falling back to
    /// `OPENAI_API_KEY` for the key and to the default timeout when
    /// `ai_timeout_seconds` is zero.
    #[must_use]
    pub fn agent_config(&self) -> OpenAiReviewAgentConfig {
        OpenAiReviewAgentConfig::new(
            self.ai_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            self.ai_model.as_deref().unwrap_or(DEFAULT_MODEL),
            self.ai_api_key
                .clone()
                .or_else(|| env::var(AI_API_KEY_ENV_VAR).ok()),
            Duration::from_secs(self.ai_timeout_secs()),
        )
    }

    const fn ai_timeout_secs(&self) -> u64 {
        if self.ai_timeout_seconds == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            self.ai_timeout_seconds
        }
    }

    /// Splits `ignored_files` into trimmed, non-empty paths.
    ///
    /// Returns `None` when nothing is ignored.
    #[must_use]
    pub fn ignored_file_paths(&self) -> Option<Vec<String>> {
        let paths: Vec<String> = self
            .ignored_files
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        (!paths.is_empty()).then_some(paths)
    }

    /// Builds the review instruction from the language and guidelines.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when both `instruction` and
    /// `instruction_file` are set, and [`ReviewError::Io`] when the file
    /// cannot be read.
    pub fn resolve_instruction(&self) -> Result<ReviewInstruction, ReviewError> {
        let instruction_text = match (&self.instruction, &self.instruction_file) {
            (Some(_), Some(_)) => {
                return Err(ReviewError::Configuration {
                    message: "use either --instruction or --instruction-file, not both".to_owned(),
                });
            }
            (Some(text), None) => text.clone(),
            (None, Some(path)) => instruction_file::read(path)?,
            (None, None) => String::new(),
        };

        let comment_language = self
            .comment_language
            .as_deref()
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .unwrap_or(DEFAULT_COMMENT_LANGUAGE);

        Ok(ReviewInstruction::new(comment_language, instruction_text))
    }

    /// Per-run switches derived from configuration.
    #[must_use]
    pub const fn run_options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests;
