//! Data models for pull request references and comments.
//!
//! Types prefixed with `Api` are wire-level (de)serialisation targets for the
//! Bitbucket Cloud REST API. They convert into the public domain types used by
//! the review pipeline.

use serde::{Deserialize, Serialize};

/// Server-reported commit range of a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    /// Pull request identifier as reported by the server.
    pub id: u64,
    /// Head commit of the source branch.
    pub source_commit_hash: String,
    /// Head commit of the destination branch.
    pub destination_commit_hash: String,
}

/// File and line a comment is anchored to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentLocation {
    /// Line number in the post-change file.
    pub line_number: u64,
    /// Repository-relative file path.
    pub file_path: String,
}

/// A comment already published on the pull request.
///
/// General comments carry no location; inline comments do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExistingComment {
    /// Comment identifier.
    pub id: u64,
    /// Raw comment text.
    pub text: String,
    /// Inline anchor, absent for general comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<CommentLocation>,
}

/// A comment ready to be sent to the comment-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishableComment {
    /// Comment text (markdown).
    pub text: String,
    /// Inline anchor.
    pub location: CommentLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub(crate) id: u64,
    pub(crate) source: ApiBranchEndpoint,
    pub(crate) destination: ApiBranchEndpoint,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiBranchEndpoint {
    pub(crate) commit: ApiCommit,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommit {
    pub(crate) hash: String,
}

impl From<ApiPullRequest> for PullRequestRef {
    fn from(api: ApiPullRequest) -> Self {
        Self {
            id: api.id,
            source_commit_hash: api.source.commit.hash,
            destination_commit_hash: api.destination.commit.hash,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommentPage {
    pub(crate) values: Vec<ApiComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiComment {
    pub(crate) id: u64,
    #[serde(default)]
    pub(crate) content: Option<ApiContent>,
    #[serde(default)]
    pub(crate) inline: Option<ApiInline>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiContent {
    #[serde(default)]
    pub(crate) raw: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiInline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) from: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) to: Option<u64>,
    pub(crate) path: String,
}

impl From<ApiComment> for ExistingComment {
    fn from(api: ApiComment) -> Self {
        let text = api
            .content
            .and_then(|content| content.raw)
            .unwrap_or_default();
        let location = api.inline.and_then(|inline| {
            inline.to.or(inline.from).map(|line_number| CommentLocation {
                line_number,
                file_path: inline.path,
            })
        });

        Self {
            id: api.id,
            text,
            location,
        }
    }
}

/// Request body accepted by `POST .../pullrequests/{id}/comments`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApiCreateComment {
    pub(crate) content: ApiContent,
    pub(crate) inline: ApiInline,
}

impl From<&PublishableComment> for ApiCreateComment {
    fn from(comment: &PublishableComment) -> Self {
        Self {
            content: ApiContent {
                raw: Some(comment.text.clone()),
            },
            inline: ApiInline {
                from: None,
                to: Some(comment.location.line_number),
                path: comment.location.file_path.clone(),
            },
        }
    }
}
