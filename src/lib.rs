//! Automated review of Bitbucket Cloud pull requests.
//!
//! The library fetches a pull request's diff and existing comments, asks a
//! reviewing agent for inline remarks, and publishes them back (or only
//! reports them in a dry run). [`ReviewOrchestrator`] holds the pipeline;
//! [`review_pull_request`] wires it to the concrete Bitbucket client and
//! OpenAI-compatible agent.

pub mod agent;
pub mod bitbucket;
pub mod config;
pub mod error;
pub mod review;
pub mod telemetry;

pub use agent::{OpenAiReviewAgent, OpenAiReviewAgentConfig, ReviewAgent};
pub use bitbucket::{
    AccessToken, BitbucketClient, BitbucketClientConfig, CommentLocation, CommentOutcome,
    ExistingComment, PublishReport, PublishableComment, PublishedComment, PullRequestIdentity,
    PullRequestNumber, PullRequestRef, RepositoryGateway, RepositoryName, StatusPolicy, Workspace,
};
pub use config::ReviewerConfig;
pub use error::ReviewError;
pub use review::{
    ChangeSet, ChangeSetService, ProposedComment, ReviewInstruction, ReviewOrchestrator,
    ReviewOutcome, ReviewStage, RunOptions,
};

/// Reviews one pull request with the configured Bitbucket client and agent.
///
/// Neither collaborator needs its credential up front; a missing token or
/// API key fails the first call that uses it.
///
/// # Errors
///
/// Returns configuration errors from building the collaborators, then the
/// first error raised by the pipeline, unchanged.
pub async fn review_pull_request(
    config: &ReviewerConfig,
    identity: &PullRequestIdentity,
    instruction: &ReviewInstruction,
    options: RunOptions,
) -> Result<ReviewOutcome, ReviewError> {
    let gateway = BitbucketClient::new(config.client_config()?)?;
    let agent = OpenAiReviewAgent::new(config.agent_config());

    ReviewOrchestrator::new(&gateway, &agent)
        .with_ignored_file_paths(config.ignored_file_paths())
        .review_pull_request(identity, instruction, options)
        .await
}
