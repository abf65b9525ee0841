//! Log output for the driver.

use anyhow::{anyhow, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,cellsim_world=debug";

/// Install the global subscriber. Logs go to stderr so stdout only carries
/// the run result. Set `CELLSIM_LOG_FORMAT=json` for one JSON object per line.
pub fn init_telemetry() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let json = std::env::var("CELLSIM_LOG_FORMAT").is_ok_and(|format| format == "json");

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))?;

    info!(json, "Telemetry initialized");
    Ok(())
}
