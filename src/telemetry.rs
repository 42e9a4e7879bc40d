//! Diagnostic logging setup.
//!
//! Library code only emits `tracing` events. The binary installs a single
//! formatting subscriber that writes to stderr, leaving stdout for the review
//! report.

use std::io;

use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::ReviewError;

/// Filter directive used when `RUST_LOG` is unset.
#[must_use]
pub const fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "pr_reviewer=debug,warn"
    } else {
        "pr_reviewer=info,warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(verbose).into())
}

/// Installs the global stderr subscriber.
///
/// `RUST_LOG` takes precedence over `verbose`.
///
/// # Errors
///
/// Returns [`ReviewError::Configuration`] when a global subscriber is
/// already installed.
pub fn init_logging(verbose: bool) -> Result<(), ReviewError> {
    let fmt_layer = fmt::Layer::new()
        .with_target(verbose)
        .with_level(true)
        .with_span_events(FmtSpan::NONE)
        .with_writer(io::stderr);

    Registry::default()
        .with(env_filter(verbose))
        .with(fmt_layer)
        .try_init()
        .map_err(|error| ReviewError::Configuration {
            message: format!("failed to initialise logging: {error}"),
        })
}
