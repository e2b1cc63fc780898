//! Logging for questctl
//!
//! Diagnostics go to stderr through `tracing-subscriber` so that stdout stays
//! clean for command output and `--json`.
//!
//! Filter priority:
//! 1. `--verbose` (debug)
//! 2. $QUESTLOG_LOG
//! 3. $RUST_LOG
//! 4. `warn`

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "QUESTLOG_LOG";

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "debug";

/// Pick the filter directive from the flag and the environment
pub fn filter_directive(verbose: bool, questlog_log: Option<String>, rust_log: Option<String>) -> String {
    if verbose {
        return VERBOSE_FILTER.to_string();
    }
    questlog_log
        .filter(|v| !v.trim().is_empty())
        .or_else(|| rust_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber
pub fn init(verbose: bool) {
    let directive = filter_directive(
        verbose,
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Already installed: keep the existing subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
