//! Development-time tracing for debugging the grader.
//!
//! Diagnostics go to stderr. Command output (outlines, feedback, counts) is
//! printed to stdout by the CLI and is never affected by the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "grader=debug" } else { "warn" }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` selects
/// `grader=debug` and the default is `warn`. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=grader=info grader grade toggle A001 deduction-1
/// ```
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
