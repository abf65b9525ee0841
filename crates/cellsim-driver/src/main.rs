//! Headless runner: load a run configuration, advance it, print the result.

mod telemetry;

use anyhow::{Context, Result};
use cellsim_core::RunConfig;
use cellsim_world::Simulation;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "cellsim-driver", version, about = "Run a cellular automaton from a JSON config")]
struct Args {
    /// Path to the run configuration (JSON)
    config: PathBuf,

    /// Overrides `num_ticks` from the configuration
    #[arg(long)]
    num_ticks: Option<u64>,
}

fn load_config(path: &Path) -> Result<RunConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry()?;

    let config = load_config(&args.config)?;
    let num_ticks = args.num_ticks.unwrap_or(config.num_ticks);

    info!(
        config = %args.config.display(),
        simulation = %config.simulation,
        num_ticks,
        "Starting cellsim driver"
    );

    let mut simulation = Simulation::from_config(&config).context("invalid run configuration")?;
    let result = simulation.run(num_ticks);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
