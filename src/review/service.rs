//! Change-set facade over the repository gateway.

use tracing::debug;

use crate::bitbucket::gateway::{PublishReport, RepositoryGateway, create_comments};
use crate::bitbucket::locator::PullRequestIdentity;
use crate::bitbucket::models::{ExistingComment, PublishableComment};
use crate::error::ReviewError;

use super::change_set::ChangeSet;

/// Composes gateway calls into the reads and writes a review needs.
pub struct ChangeSetService<'client, Gateway>
where
    Gateway: RepositoryGateway + ?Sized,
{
    client: &'client Gateway,
}

impl<'client, Gateway> ChangeSetService<'client, Gateway>
where
    Gateway: RepositoryGateway + ?Sized,
{
    /// Create a new service using the provided gateway.
    #[must_use]
    pub const fn new(client: &'client Gateway) -> Self {
        Self { client }
    }

    /// Load the diff of the pull request, minus any ignored files.
    ///
    /// Fetches the commit range first, then the diff between its two
    /// commits. A file is dropped when its old or new path exactly equals an
    /// entry of `ignored_file_paths`.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures unchanged. Returns
    /// [`ReviewError::Upstream`] when the diff text cannot be parsed.
    pub async fn get_pull_request_diff(
        &self,
        identity: &PullRequestIdentity,
        ignored_file_paths: Option<&[String]>,
    ) -> Result<ChangeSet, ReviewError> {
        let pull_request = self.client.fetch_pull_request_ref(identity).await?;
        let diff_text = self
            .client
            .fetch_diff(
                identity,
                &pull_request.source_commit_hash,
                &pull_request.destination_commit_hash,
            )
            .await?;

        let change_set = ChangeSet::parse(&diff_text)?;
        let total = change_set.len();
        let filtered = change_set.without_paths(ignored_file_paths);
        debug!(
            %identity,
            files = filtered.len(),
            ignored = total - filtered.len(),
            "loaded pull request diff"
        );
        Ok(filtered)
    }

    /// Load every existing comment on the pull request.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures unchanged.
    pub async fn list_pull_request_comments(
        &self,
        identity: &PullRequestIdentity,
    ) -> Result<Vec<ExistingComment>, ReviewError> {
        self.client.list_comments(identity).await
    }

    /// Publish comments concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first credential or transport failure after every request
    /// has settled.
    pub async fn create_pull_request_comments(
        &self,
        identity: &PullRequestIdentity,
        comments: &[PublishableComment],
    ) -> Result<PublishReport, ReviewError> {
        create_comments(self.client, identity, comments).await
    }
}
