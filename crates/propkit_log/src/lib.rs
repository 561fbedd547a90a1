//! `propkit_log` v1:
//! stderr tracing setup shared by propkit binaries.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Map a `-v` count to the default filter directive.
///
/// `0 -> warn`, `1 -> info`, `2 -> debug`, `3+ -> trace`.
pub fn derive_default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the filter: `RUST_LOG` when set and valid, else the verbosity default.
pub fn derive_env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(derive_default_filter(verbosity)))
}

/// Install the global subscriber, writing to stderr.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(verbosity: u8) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(derive_env_filter(verbosity))
        .try_init()
}
