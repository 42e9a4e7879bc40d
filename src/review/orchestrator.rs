//! The review pipeline: fetch, review, transform, then report or publish.
//!
//! A [`ReviewOrchestrator`] performs exactly one pass. The first error in
//! any stage aborts the remaining stages and is returned unchanged; nothing
//! is retried and comments that were already published stay published.

use std::fmt;

use tracing::{info, warn};

use crate::agent::ReviewAgent;
use crate::bitbucket::gateway::{PublishReport, RepositoryGateway};
use crate::bitbucket::locator::PullRequestIdentity;
use crate::bitbucket::models::PublishableComment;
use crate::error::ReviewError;

use super::model::{ReviewInstruction, RunOptions};
use super::service::ChangeSetService;
use super::transform::to_publishable;

/// Position of a run in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStage {
    /// Loading the diff and the existing comments.
    Fetching,
    /// Waiting for the reviewing agent.
    Reviewing,
    /// Surfacing comments without writing them.
    DryRunReporting,
    /// Creating comments on the pull request.
    Publishing,
    /// Finished successfully.
    Done,
    /// Aborted by an error.
    Failed,
}

impl ReviewStage {
    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Reviewing => "reviewing",
            Self::DryRunReporting => "dry-run reporting",
            Self::Publishing => "publishing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Comments that would have been published.
    DryRun(Vec<PublishableComment>),
    /// Per-comment results of publication.
    Published(PublishReport),
}

/// Stage bookkeeping for a single pass.
#[derive(Debug)]
struct ReviewRun<'a> {
    identity: &'a PullRequestIdentity,
    history: Vec<ReviewStage>,
}

impl<'a> ReviewRun<'a> {
    const fn new(identity: &'a PullRequestIdentity) -> Self {
        Self {
            identity,
            history: Vec::new(),
        }
    }

    fn enter(&mut self, stage: ReviewStage) {
        info!(identity = %self.identity, %stage, "review stage");
        self.history.push(stage);
    }

    fn finish<T>(&mut self, result: &Result<T, ReviewError>) {
        match result {
            Ok(_) => self.enter(ReviewStage::Done),
            Err(error) => {
                warn!(identity = %self.identity, %error, "review failed");
                self.enter(ReviewStage::Failed);
            }
        }
    }
}

/// Drives one review of one pull request.
pub struct ReviewOrchestrator<'a, Gateway, Agent>
where
    Gateway: RepositoryGateway + ?Sized,
    Agent: ReviewAgent + ?Sized,
{
    gateway: &'a Gateway,
    agent: &'a Agent,
    ignored_file_paths: Option<Vec<String>>,
}

impl<'a, Gateway, Agent> ReviewOrchestrator<'a, Gateway, Agent>
where
    Gateway: RepositoryGateway + ?Sized,
    Agent: ReviewAgent + ?Sized,
{
    /// Create an orchestrator over the given collaborators.
    #[must_use]
    pub const fn new(gateway: &'a Gateway, agent: &'a Agent) -> Self {
        Self {
            gateway,
            agent,
            ignored_file_paths: None,
        }
    }

    /// Exclude files from the diff by exact old or new path.
    #[must_use]
    pub fn with_ignored_file_paths(mut self, paths: Option<Vec<String>>) -> Self {
        self.ignored_file_paths = paths;
        self
    }

    /// Review the pull request once.
    ///
    /// Consumes the orchestrator; a retry needs a fresh one.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while fetching, reviewing, or
    /// publishing, unchanged.
    pub async fn review_pull_request(
        self,
        identity: &PullRequestIdentity,
        instruction: &ReviewInstruction,
        options: RunOptions,
    ) -> Result<ReviewOutcome, ReviewError> {
        let mut run = ReviewRun::new(identity);
        let result = self.drive(&mut run, instruction, options).await;
        run.finish(&result);
        result
    }

    async fn drive(
        &self,
        run: &mut ReviewRun<'_>,
        instruction: &ReviewInstruction,
        options: RunOptions,
    ) -> Result<ReviewOutcome, ReviewError> {
        let identity = run.identity;
        let service = ChangeSetService::new(self.gateway);

        run.enter(ReviewStage::Fetching);
        // Both reads run to completion; a failure in one does not cancel the
        // other.
        let (change_set, existing_comments) = tokio::join!(
            service.get_pull_request_diff(identity, self.ignored_file_paths.as_deref()),
            service.list_pull_request_comments(identity),
        );
        let change_set = change_set?;
        let existing_comments = existing_comments?;

        run.enter(ReviewStage::Reviewing);
        let proposed = self
            .agent
            .review(instruction, &change_set, &existing_comments)
            .await?;
        let comments = to_publishable(proposed);

        if options.dry_run {
            run.enter(ReviewStage::DryRunReporting);
            for comment in &comments {
                info!(
                    path = %comment.location.file_path,
                    line = comment.location.line_number,
                    "dry-run comment: {}",
                    comment.text
                );
            }
            return Ok(ReviewOutcome::DryRun(comments));
        }

        run.enter(ReviewStage::Publishing);
        let report = service
            .create_pull_request_comments(identity, &comments)
            .await?;
        Ok(ReviewOutcome::Published(report))
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
