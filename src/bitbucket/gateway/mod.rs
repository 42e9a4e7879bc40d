//! Gateways for reading and writing pull request state on Bitbucket.
//!
//! [`RepositoryGateway`] is the narrow contract the rest of the crate depends
//! on, so the review pipeline can be exercised against mocks. The
//! [`BitbucketClient`] implementation issues authenticated HTTP requests with
//! `reqwest` and knows the endpoint shapes and pagination mechanics.

mod client;
mod error_mapping;
mod publish;

pub use client::{
    BitbucketClient, BitbucketClientConfig, DEFAULT_API_BASE, StatusPolicy, TOKEN_ENV_VAR,
};
pub use publish::{CommentOutcome, PublishReport, PublishedComment, create_comments};

use async_trait::async_trait;

use crate::bitbucket::locator::PullRequestIdentity;
use crate::bitbucket::models::{ExistingComment, PublishableComment, PullRequestRef};
use crate::error::ReviewError;

/// Gateway that can load and annotate pull request data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    /// Fetch the commit range of the pull request.
    async fn fetch_pull_request_ref(
        &self,
        identity: &PullRequestIdentity,
    ) -> Result<PullRequestRef, ReviewError>;

    /// Fetch the raw unified diff between two commits.
    async fn fetch_diff(
        &self,
        identity: &PullRequestIdentity,
        source_hash: &str,
        destination_hash: &str,
    ) -> Result<String, ReviewError>;

    /// Fetch every existing comment on the pull request, in server order.
    async fn list_comments(
        &self,
        identity: &PullRequestIdentity,
    ) -> Result<Vec<ExistingComment>, ReviewError>;

    /// Create one inline comment.
    ///
    /// A response the server refuses is reported as
    /// [`CommentOutcome::Rejected`]; only credential and transport failures
    /// are errors.
    async fn create_comment(
        &self,
        identity: &PullRequestIdentity,
        comment: &PublishableComment,
    ) -> Result<CommentOutcome, ReviewError>;
}
