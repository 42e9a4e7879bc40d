//! Output formatting utilities for CLI operations.

use std::io::Write;

use pr_reviewer::{
    CommentOutcome, PublishReport, PublishableComment, PullRequestIdentity, ReviewError,
    ReviewOutcome,
};

/// Writes the human-readable result of a run to the given writer.
pub fn write_outcome_to<W: Write>(
    writer: &mut W,
    identity: &PullRequestIdentity,
    outcome: &ReviewOutcome,
) -> Result<(), ReviewError> {
    match outcome {
        ReviewOutcome::DryRun(comments) => write_dry_run_report_to(writer, identity, comments),
        ReviewOutcome::Published(report) => write_publish_summary_to(writer, identity, report),
    }
}

/// Writes one block per proposed comment: `path:line`, then the text.
pub fn write_dry_run_report_to<W: Write>(
    writer: &mut W,
    identity: &PullRequestIdentity,
    comments: &[PublishableComment],
) -> Result<(), ReviewError> {
    if comments.is_empty() {
        writeln!(writer, "Dry run for {identity}: no comments proposed").map_err(|e| io_error(&e))?;
        return Ok(());
    }

    writeln!(
        writer,
        "Dry run for {identity}: {} comment(s) proposed",
        comments.len()
    )
    .map_err(|e| io_error(&e))?;

    for comment in comments {
        writeln!(writer).map_err(|e| io_error(&e))?;
        writeln!(
            writer,
            "{}:{}",
            comment.location.file_path, comment.location.line_number
        )
        .map_err(|e| io_error(&e))?;
        writeln!(writer, "{}", comment.text).map_err(|e| io_error(&e))?;
    }

    Ok(())
}

/// Writes created and rejected counts followed by each rejection.
pub fn write_publish_summary_to<W: Write>(
    writer: &mut W,
    identity: &PullRequestIdentity,
    report: &PublishReport,
) -> Result<(), ReviewError> {
    let rejected = report.rejected().count();
    writeln!(
        writer,
        "Published to {identity}: {} created, {rejected} rejected",
        report.created_count()
    )
    .map_err(|e| io_error(&e))?;

    for entry in report.rejected() {
        if let CommentOutcome::Rejected { status, message } = &entry.outcome {
            writeln!(
                writer,
                "  rejected {}:{} ({status}): {message}",
                entry.comment.location.file_path, entry.comment.location.line_number
            )
            .map_err(|e| io_error(&e))?;
        }
    }

    Ok(())
}

fn io_error(error: &std::io::Error) -> ReviewError {
    ReviewError::Io {
        message: error.to_string(),
    }
}
