//! Diagnostic logging to stderr.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_ENV_VAR: &str = "BOOKFINDER_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

/// Filter from `BOOKFINDER_LOG`, or `warn` when unset or unparsable.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging() -> Result<(), tracing_subscriber::util::TryInitError> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter());
    tracing_subscriber::registry().with(stderr_layer).try_init()
}
