//! Bitbucket Cloud repository client.
//!
//! This module knows how to address a pull request, how Bitbucket pages its
//! collections, and how to read and write pull request state over HTTP.
//! Nothing here interprets the data beyond mapping it into domain types.

pub mod gateway;
pub mod locator;
pub mod models;
pub mod pagination;

pub use gateway::{
    BitbucketClient, BitbucketClientConfig, CommentOutcome, PublishReport, PublishedComment,
    RepositoryGateway, StatusPolicy, create_comments,
};
pub use locator::{AccessToken, PullRequestIdentity, PullRequestNumber, RepositoryName, Workspace};
pub use models::{CommentLocation, ExistingComment, PublishableComment, PullRequestRef};

#[cfg(test)]
pub use gateway::MockRepositoryGateway;
