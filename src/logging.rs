//! Diagnostic logging for artistfolio.
//!
//! Console output for the user goes through the `info!`/`success!`/`warning!`
//! macros. This module sets up `tracing` for request-level diagnostics, written
//! to stderr so it never interleaves with piped `--json` output.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "artistfolio=warn";

/// Initialize the logging system.
///
/// The log level can be controlled via the `RUST_LOG` environment variable,
/// e.g. `RUST_LOG=artistfolio=debug`. `verbose` raises the default to debug.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "artistfolio=debug,warn"
        } else {
            DEFAULT_FILTER
        })
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time();

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
