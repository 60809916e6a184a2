//! Logging setup
//!
//! Installs a `tracing` subscriber writing to stderr so log lines never mix
//! with the styled report on stdout. `RUST_LOG` takes precedence over the
//! built-in default.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "csat=warn";

/// Filter used with `--verbose`
pub const VERBOSE_FILTER: &str = "csat=debug";

/// Resolve the filter directive for this run
pub fn filter_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Initialize the global subscriber. Calling it twice is harmless.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
