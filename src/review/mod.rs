//! The review pipeline.
//!
//! [`ChangeSetService`] turns gateway calls into the reads and writes a
//! review needs, [`ChangeSet`] is the structured diff handed to the agent,
//! and [`ReviewOrchestrator`] sequences one run end to end.

pub mod change_set;
pub mod model;
pub mod orchestrator;
pub mod service;
pub mod transform;

pub use change_set::{ChangeKind, ChangeSet, DiffFile, DiffHunk, DiffLine};
pub use model::{DEFAULT_COMMENT_LANGUAGE, ProposedComment, ReviewInstruction, RunOptions};
pub use orchestrator::{ReviewOrchestrator, ReviewOutcome, ReviewStage};
pub use service::ChangeSetService;
pub use transform::to_publishable;
