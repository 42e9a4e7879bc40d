//! Concurrent comment publication with per-comment outcomes.

use futures::future::join_all;
use tracing::{info, warn};

use crate::bitbucket::locator::PullRequestIdentity;
use crate::bitbucket::models::PublishableComment;
use crate::error::ReviewError;

use super::RepositoryGateway;

/// Result of a single comment-creation request that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOutcome {
    /// The server created the comment.
    Created {
        /// Identifier of the new comment when the response reported one.
        id: Option<u64>,
    },
    /// The server answered with a non-success status.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error detail extracted from the response body.
        message: String,
    },
}

impl CommentOutcome {
    /// Returns true when the comment was created.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// A comment paired with the outcome of its creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedComment {
    /// The comment that was sent.
    pub comment: PublishableComment,
    /// What the server did with it.
    pub outcome: CommentOutcome,
}

/// Per-comment outcomes of a publish, in input order.
///
/// Publication is best-effort and non-atomic: created comments stay created
/// even when siblings were rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    entries: Vec<PublishedComment>,
}

impl PublishReport {
    /// Builds a report from ordered entries.
    #[must_use]
    pub const fn new(entries: Vec<PublishedComment>) -> Self {
        Self { entries }
    }

    /// All entries in input order.
    #[must_use]
    pub fn entries(&self) -> &[PublishedComment] {
        &self.entries
    }

    /// Number of comments the server created.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome.is_created())
            .count()
    }

    /// Entries the server refused.
    pub fn rejected(&self) -> impl Iterator<Item = &PublishedComment> {
        self.entries
            .iter()
            .filter(|entry| !entry.outcome.is_created())
    }

    /// Returns true when every comment was created.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|entry| entry.outcome.is_created())
    }
}

/// Creates all comments concurrently and waits for every request to settle.
///
/// There is no ordering guarantee between requests and no rate limiting. A
/// failing request does not cancel its siblings; once all have settled the
/// first error (in input order) is returned and comments that were already
/// created remain on the pull request.
///
/// # Errors
///
/// Returns the first [`ReviewError`] produced by any creation request.
pub async fn create_comments<G>(
    gateway: &G,
    identity: &PullRequestIdentity,
    comments: &[PublishableComment],
) -> Result<PublishReport, ReviewError>
where
    G: RepositoryGateway + ?Sized,
{
    let results = join_all(
        comments
            .iter()
            .map(|comment| gateway.create_comment(identity, comment)),
    )
    .await;

    let mut entries = Vec::with_capacity(comments.len());
    for (comment, result) in comments.iter().zip(results) {
        let outcome = result?;
        if let CommentOutcome::Rejected { status, message } = &outcome {
            warn!(
                path = %comment.location.file_path,
                line = comment.location.line_number,
                status,
                "comment rejected: {message}"
            );
        }
        entries.push(PublishedComment {
            comment: comment.clone(),
            outcome,
        });
    }

    let report = PublishReport::new(entries);
    info!(
        %identity,
        created = report.created_count(),
        total = comments.len(),
        "published review comments"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rstest::{fixture, rstest};

    use super::{CommentOutcome, create_comments};
    use crate::bitbucket::gateway::MockRepositoryGateway;
    use crate::bitbucket::locator::PullRequestIdentity;
    use crate::bitbucket::models::{CommentLocation, PublishableComment};
    use crate::error::ReviewError;

    #[fixture]
    fn identity() -> PullRequestIdentity {
        PullRequestIdentity::from_parts("w", "r", 123).expect("identity should be valid")
    }

    fn comment(path: &str, line: u64) -> PublishableComment {
        PublishableComment {
            text: format!("note on {path}:{line}"),
            location: CommentLocation {
                line_number: line,
                file_path: path.to_owned(),
            },
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_comments_reports_outcomes_in_input_order(identity: PullRequestIdentity) {
        let mut gateway = MockRepositoryGateway::new();
        gateway
            .expect_create_comment()
            .times(3)
            .returning(|_, comment| {
                if comment.location.file_path == "bad.ts" {
                    Ok(CommentOutcome::Rejected {
                        status: 400,
                        message: "line is not part of the diff".to_owned(),
                    })
                } else {
                    Ok(CommentOutcome::Created { id: Some(1) })
                }
            });
        let comments = vec![comment("a.ts", 1), comment("bad.ts", 2), comment("c.ts", 3)];

        let report = create_comments(&gateway, &identity, &comments)
            .await
            .expect("publish should succeed");

        let paths: Vec<_> = report
            .entries()
            .iter()
            .map(|entry| entry.comment.location.file_path.as_str())
            .collect();
        assert_eq!(paths, ["a.ts", "bad.ts", "c.ts"]);
        assert_eq!(report.created_count(), 2);
        assert_eq!(report.rejected().count(), 1);
        assert!(!report.is_complete());
    }

    #[rstest]
    #[tokio::test]
    async fn create_comments_waits_for_siblings_before_failing(identity: PullRequestIdentity) {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let mut gateway = MockRepositoryGateway::new();
        gateway
            .expect_create_comment()
            .times(3)
            .returning(move |_, comment| {
                counter.fetch_add(1, Ordering::SeqCst);
                if comment.location.line_number == 1 {
                    Err(ReviewError::Network {
                        message: "connection reset".to_owned(),
                    })
                } else {
                    Ok(CommentOutcome::Created { id: None })
                }
            });
        let comments = vec![comment("a.ts", 1), comment("b.ts", 2), comment("c.ts", 3)];

        let error = create_comments(&gateway, &identity, &comments)
            .await
            .expect_err("publish should fail");

        assert!(matches!(error, ReviewError::Network { .. }), "got {error:?}");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn create_comments_with_no_comments_sends_nothing(identity: PullRequestIdentity) {
        let mut gateway = MockRepositoryGateway::new();
        gateway.expect_create_comment().never();

        let report = create_comments(&gateway, &identity, &[])
            .await
            .expect("empty publish should succeed");

        assert!(report.entries().is_empty());
        assert!(report.is_complete());
    }
}
