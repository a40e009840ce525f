//! Tracing subscriber setup for the binary

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`EnvFilter` syntax)
pub const LOG_ENV: &str = "VERIBENCH_LOG";

const DEFAULT_FILTER: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a stderr subscriber. Later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
