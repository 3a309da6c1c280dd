//! Diagnostics for the facility itself
//!
//! Failures inside the destinations (log directory missing, console gone)
//! are reported through `tracing`. This installs a stderr subscriber for them
//! so they never mix with the console destination on stdout.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_DIAGNOSTICS_FILTER: &str = "routelog=info";

/// Install the stderr diagnostics subscriber
///
/// Fails if a global subscriber is already installed.
pub fn init_diagnostics() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_DIAGNOSTICS_FILTER.into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .context("Failed to initialize diagnostics subscriber")
}
