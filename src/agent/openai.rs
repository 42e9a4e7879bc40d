//! OpenAI-compatible HTTP implementation of the reviewing agent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::bitbucket::models::ExistingComment;
use crate::error::{ReviewError, truncate_for_message};
use crate::review::change_set::ChangeSet;
use crate::review::model::{ProposedComment, ReviewInstruction};

use super::ReviewAgent;
use super::prompt::{system_prompt, user_prompt};

/// Default chat-completions API base.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default reviewing model.
pub const DEFAULT_MODEL: &str = "o4-mini";
/// Default request timeout in seconds. Reasoning models can take a while.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for [`OpenAiReviewAgent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiReviewAgentConfig {
    /// Base API URL (e.g., `https://api.openai.com/v1`).
    pub base_url: String,
    /// Model identifier sent in chat-completions requests.
    pub model: String,
    /// API key used for bearer authentication.
    pub api_key: Option<String>,
    /// HTTP timeout.
    pub timeout: Duration,
}

impl Default for OpenAiReviewAgentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OpenAiReviewAgentConfig {
    /// Constructs configuration with required API settings.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            timeout,
        }
    }
}

/// Reviewing agent backed by a structured-output chat-completions call.
#[derive(Debug, Clone, Default)]
pub struct OpenAiReviewAgent {
    config: OpenAiReviewAgentConfig,
}

impl OpenAiReviewAgent {
    /// Creates an agent from explicit configuration.
    #[must_use]
    pub const fn new(config: OpenAiReviewAgentConfig) -> Self {
        Self { config }
    }

    fn extract_api_key(&self) -> Result<&str, ReviewError> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ReviewError::Configuration {
                message: concat!(
                    "AI API key is required (use --ai-api-key, ",
                    "PR_REVIEWER_AI_API_KEY, or OPENAI_API_KEY)"
                )
                .to_owned(),
            })
    }

    fn create_http_client(&self) -> Result<Client, ReviewError> {
        Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|error| ReviewError::Configuration {
                message: format!("failed to configure AI HTTP client: {error}"),
            })
    }
}

#[async_trait]
impl ReviewAgent for OpenAiReviewAgent {
    async fn review(
        &self,
        instruction: &ReviewInstruction,
        change_set: &ChangeSet,
        existing_comments: &[ExistingComment],
    ) -> Result<Option<Vec<ProposedComment>>, ReviewError> {
        let api_key = self.extract_api_key()?;
        let endpoint = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = ChatCompletionsRequest {
            model: self.config.model.as_str(),
            messages: vec![
                ChatCompletionsMessage {
                    role: "system",
                    content: system_prompt(instruction)?,
                },
                ChatCompletionsMessage {
                    role: "user",
                    content: user_prompt(change_set, existing_comments)?,
                },
            ],
            response_format: comments_response_format(),
        };

        debug!(
            model = %self.config.model,
            files = change_set.len(),
            existing = existing_comments.len(),
            "requesting review"
        );

        let response = self
            .create_http_client()?
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| ReviewError::Network {
                message: format!("AI request transport failed: {error}"),
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.map_or_else(
                |_| "(failed to read error response body)".to_owned(),
                |content| truncate_for_message(content.as_str(), 160),
            );
            return Err(ReviewError::Agent {
                message: format!("AI request failed with status {}: {body}", status.as_u16()),
            });
        }

        let response_payload: ChatCompletionsResponse =
            response.json().await.map_err(|error| ReviewError::Agent {
                message: format!("AI response JSON decoding failed: {error}"),
            })?;

        parse_review_reply(response_payload)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionsMessage>,
    response_format: Value,
}

#[derive(Debug, Serialize)]
struct ChatCompletionsMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewReply {
    comments: Vec<ProposedComment>,
}

fn comments_response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "comments",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "comments": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "commentLine": { "type": "integer", "minimum": 0 },
                                "filepath": { "type": "string" },
                                "comment": { "type": "string" }
                            },
                            "required": ["commentLine", "filepath", "comment"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["comments"],
                "additionalProperties": false
            }
        }
    })
}

/// Extracts proposed comments from the first choice.
///
/// A refusal, a missing choice, or null content yields `Ok(None)`.
fn parse_review_reply(
    response: ChatCompletionsResponse,
) -> Result<Option<Vec<ProposedComment>>, ReviewError> {
    let Some(message) = response.choices.into_iter().next().map(|choice| choice.message) else {
        return Ok(None);
    };

    if let Some(refusal) = message.refusal {
        debug!(refusal = %refusal, "model refused to review");
        return Ok(None);
    }

    let Some(content) = message.content.filter(|content| !content.trim().is_empty()) else {
        return Ok(None);
    };

    serde_json::from_str::<ReviewReply>(&content)
        .map(|reply| Some(reply.comments))
        .map_err(|error| ReviewError::Agent {
            message: format!("AI reply did not match the comment schema: {error}"),
        })
}

#[cfg(test)]
#[path = "openai_tests.rs"]
mod tests;
