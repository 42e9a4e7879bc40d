//! Values threaded through one review run.

use serde::{Deserialize, Serialize};

/// Default language for generated review comments.
pub const DEFAULT_COMMENT_LANGUAGE: &str = "English";

/// Guidance handed to the reviewing agent unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInstruction {
    /// Natural language the agent should write its comments in.
    pub comment_language: String,
    /// Project-specific review guidelines.
    pub instruction_text: String,
}

impl ReviewInstruction {
    /// Creates an instruction from its two parts.
    #[must_use]
    pub fn new(comment_language: impl Into<String>, instruction_text: impl Into<String>) -> Self {
        Self {
            comment_language: comment_language.into(),
            instruction_text: instruction_text.into(),
        }
    }
}

impl Default for ReviewInstruction {
    fn default() -> Self {
        Self::new(DEFAULT_COMMENT_LANGUAGE, "")
    }
}

/// Per-invocation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOptions {
    /// Report comments instead of publishing them.
    pub dry_run: bool,
}

impl RunOptions {
    /// Options for a run that reports without writing.
    #[must_use]
    pub const fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Options for a run that publishes its comments.
    #[must_use]
    pub const fn publish() -> Self {
        Self { dry_run: false }
    }
}

/// A review remark suggested by the agent.
///
/// Field names follow the agent's JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedComment {
    /// Line in the post-change file the remark applies to.
    pub comment_line: u64,
    /// Post-change path of the file.
    pub filepath: String,
    /// Markdown text of the remark.
    pub comment: String,
}
