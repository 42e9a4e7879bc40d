//! CLI wiring for a single review run.
//!
//! - [`review`]: resolves configuration and runs the pipeline
//! - [`output`]: writes the dry-run report and the publish summary

pub mod output;
pub mod review;
