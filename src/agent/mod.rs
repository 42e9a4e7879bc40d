//! Reviewing agent contract and its OpenAI-compatible implementation.
//!
//! The orchestrator only depends on [`ReviewAgent`]. Avoiding duplicates of
//! existing comments is part of the agent's instructions and is not checked
//! locally.

mod openai;
mod prompt;

pub use openai::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, OpenAiReviewAgent,
    OpenAiReviewAgentConfig,
};

use async_trait::async_trait;

use crate::bitbucket::models::ExistingComment;
use crate::error::ReviewError;
use crate::review::change_set::ChangeSet;
use crate::review::model::{ProposedComment, ReviewInstruction};

/// Generative reviewer that turns a change set into proposed comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewAgent: Send + Sync {
    /// Review `change_set` in the light of `existing_comments`.
    ///
    /// `Ok(None)` means the agent produced no usable result and is treated
    /// as "nothing to add".
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Agent`] when the call failed or the reply had
    /// an unusable shape.
    async fn review(
        &self,
        instruction: &ReviewInstruction,
        change_set: &ChangeSet,
        existing_comments: &[ExistingComment],
    ) -> Result<Option<Vec<ProposedComment>>, ReviewError>;
}
