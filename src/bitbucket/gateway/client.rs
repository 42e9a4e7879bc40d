//! `reqwest` implementation of the repository gateway for Bitbucket Cloud.

use std::env;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::bitbucket::locator::{AccessToken, PullRequestIdentity};
use crate::bitbucket::models::{
    ApiComment, ApiCommentPage, ApiCreateComment, ApiPullRequest, ExistingComment,
    PublishableComment, PullRequestRef,
};
use crate::bitbucket::pagination::{COMMENTS_PAGE_SIZE, PageRequest, collect_pages};
use crate::error::ReviewError;

use super::RepositoryGateway;
use super::error_mapping::{
    extract_bitbucket_message, map_decode_error, map_http_error, map_transport_error,
};
use super::publish::CommentOutcome;

/// Default Bitbucket Cloud REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.bitbucket.org/2.0";

/// Environment variable consulted when no explicit token is configured.
pub const TOKEN_ENV_VAR: &str = "BITBUCKET_ACCESS_TOKEN";

const USER_AGENT: &str = concat!("pr-reviewer/", env!("CARGO_PKG_VERSION"));

/// How read operations treat non-success HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Non-success statuses become [`ReviewError::Authentication`] or
    /// [`ReviewError::Upstream`].
    #[default]
    Strict,
    /// The status is not inspected and the body is decoded as though the
    /// request succeeded. Diff bodies are returned verbatim; JSON bodies
    /// that do not decode still fail with [`ReviewError::Upstream`].
    PassThrough,
}

/// Configuration for [`BitbucketClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitbucketClientConfig {
    /// REST API base URL, without the `repositories/` segment.
    pub api_base: String,
    /// Explicitly configured credential. Takes precedence over the
    /// environment.
    pub token: Option<AccessToken>,
    /// Environment variable to fall back on when `token` is absent.
    pub token_env_var: Option<String>,
    /// Status handling for read operations.
    pub status_policy: StatusPolicy,
}

impl Default for BitbucketClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            token: None,
            token_env_var: Some(TOKEN_ENV_VAR.to_owned()),
            status_policy: StatusPolicy::default(),
        }
    }
}

impl BitbucketClientConfig {
    /// Configuration pointing at `api_base` with an explicit credential.
    #[must_use]
    pub fn new(api_base: impl Into<String>, token: Option<AccessToken>) -> Self {
        Self {
            api_base: api_base.into(),
            token,
            ..Self::default()
        }
    }

    /// Replaces the status policy.
    #[must_use]
    pub const fn with_status_policy(mut self, status_policy: StatusPolicy) -> Self {
        self.status_policy = status_policy;
        self
    }

    /// Replaces the environment fallback for the credential.
    #[must_use]
    pub fn with_token_env_var(mut self, token_env_var: Option<String>) -> Self {
        self.token_env_var = token_env_var;
        self
    }
}

/// Bitbucket Cloud REST client.
///
/// Construction never fails for a missing credential; the token is resolved
/// on every request so that absence surfaces as
/// [`ReviewError::MissingToken`] from the call that needed it.
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    http: Client,
    config: BitbucketClientConfig,
}

impl BitbucketClient {
    /// Builds a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: BitbucketClientConfig) -> Result<Self, ReviewError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| ReviewError::Configuration {
                message: format!("failed to configure Bitbucket HTTP client: {error}"),
            })?;
        Ok(Self { http, config })
    }

    /// Resolves the bearer credential from configuration, then the
    /// designated environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::MissingToken`] when neither source yields a
    /// non-blank value.
    pub fn resolve_token(&self) -> Result<AccessToken, ReviewError> {
        if let Some(token) = &self.config.token {
            return Ok(token.clone());
        }

        self.config
            .token_env_var
            .as_deref()
            .and_then(|name| env::var(name).ok())
            .ok_or(ReviewError::MissingToken)
            .and_then(AccessToken::new)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.api_base.trim_end_matches('/'))
    }

    fn authorised(&self, builder: RequestBuilder) -> Result<RequestBuilder, ReviewError> {
        let token = self.resolve_token()?;
        Ok(builder.bearer_auth(token.value()))
    }

    async fn send(&self, operation: &str, builder: RequestBuilder) -> Result<Response, ReviewError> {
        self.authorised(builder)?
            .send()
            .await
            .map_err(|error| map_transport_error(operation, &error))
    }

    /// Reads the response body, applying the configured status policy.
    async fn read_body(&self, operation: &str, response: Response) -> Result<String, ReviewError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| map_transport_error(operation, &error))?;

        debug!(operation, status = status.as_u16(), "received response");

        if self.config.status_policy == StatusPolicy::Strict && !status.is_success() {
            return Err(map_http_error(
                operation,
                status,
                extract_bitbucket_message(&body),
            ));
        }
        Ok(body)
    }

    async fn get_json<T>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ReviewError>
    where
        T: DeserializeOwned,
    {
        let request = self.http.get(self.endpoint(path)).query(query);
        let response = self.send(operation, request).await?;
        let body = self.read_body(operation, response).await?;
        serde_json::from_str(&body).map_err(|error| map_decode_error(operation, &error))
    }

    async fn fetch_comment_page(
        &self,
        identity: &PullRequestIdentity,
        request: PageRequest,
    ) -> Result<Vec<ExistingComment>, ReviewError> {
        let operation = format!("comments page {}", request.page());
        let path = format!("{}/", identity.comments_path());
        let page: ApiCommentPage = self.get_json(&operation, &path, &request.query()).await?;
        Ok(page.values.into_iter().map(ApiComment::into).collect())
    }
}

#[async_trait]
impl RepositoryGateway for BitbucketClient {
    async fn fetch_pull_request_ref(
        &self,
        identity: &PullRequestIdentity,
    ) -> Result<PullRequestRef, ReviewError> {
        self.get_json::<ApiPullRequest>("pull request", &identity.pull_request_path(), &[])
            .await
            .map(ApiPullRequest::into)
    }

    async fn fetch_diff(
        &self,
        identity: &PullRequestIdentity,
        source_hash: &str,
        destination_hash: &str,
    ) -> Result<String, ReviewError> {
        let request = self
            .http
            .get(self.endpoint(&identity.diff_path(source_hash, destination_hash)))
            .query(&[("binary", "false")]);
        let response = self.send("diff", request).await?;
        self.read_body("diff", response).await
    }

    async fn list_comments(
        &self,
        identity: &PullRequestIdentity,
    ) -> Result<Vec<ExistingComment>, ReviewError> {
        collect_pages(COMMENTS_PAGE_SIZE, |request| {
            self.fetch_comment_page(identity, request)
        })
        .await
    }

    async fn create_comment(
        &self,
        identity: &PullRequestIdentity,
        comment: &PublishableComment,
    ) -> Result<CommentOutcome, ReviewError> {
        let request = self
            .http
            .post(self.endpoint(&identity.comments_path()))
            .json(&ApiCreateComment::from(comment));
        let response = self.send("create comment", request).await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| map_transport_error("create comment", &error))?;
        debug!(status = status.as_u16(), "comment creation answered");

        if status.is_success() {
            let id = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| value.get("id").and_then(serde_json::Value::as_u64));
            Ok(CommentOutcome::Created { id })
        } else {
            Ok(CommentOutcome::Rejected {
                status: status.as_u16(),
                message: extract_bitbucket_message(&body)
                    .unwrap_or_else(|| "no error detail".to_owned()),
            })
        }
    }
}
