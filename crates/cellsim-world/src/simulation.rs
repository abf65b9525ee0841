//! Simulation engine for running one grid under one rule set.

use crate::grid::Grid;
use crate::registry::SimulationKind;
use crate::rules::SimulationRules;
use cellsim_core::{Location, Result, RunConfig};
use cellsim_ir::Program;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

pub struct Simulation {
    grid: Grid,
    rules: Box<dyn SimulationRules>,
    tick: u64,
    metrics_interval: u64,
    updates_applied: u64,
}

impl Simulation {
    pub fn new(grid: Grid, rules: Box<dyn SimulationRules>) -> Self {
        Self {
            grid,
            rules,
            tick: 0,
            metrics_interval: 0,
            updates_applied: 0,
        }
    }

    /// Build the grid and rules a run configuration describes.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        let kind: SimulationKind = config.simulation.parse()?;

        let mut params = config.parameters.clone();
        if !params.contains("seed") {
            params.insert("seed", config.seed as i64);
        }
        let species: BTreeMap<u32, Program> = config
            .species
            .iter()
            .map(|(id, text)| (*id, Program::parse(text)))
            .collect();
        let rules = kind.build_rules(&params, &species)?;

        let mut grid = Grid::new(config.rows, config.cols, config.edge);
        for row in 0..config.rows {
            for col in 0..config.cols {
                let state = config.initial_state(row as usize, col as usize);
                let cell = kind.initial_cell(rules.as_ref(), state, Location::new(row, col))?;
                grid.add_cell(cell);
            }
        }

        info!(
            simulation = kind.name(),
            rows = config.rows,
            cols = config.cols,
            edge = %config.edge,
            "Simulation created"
        );

        let mut sim = Self::new(grid, rules);
        sim.metrics_interval = config.metrics_interval;
        Ok(sim)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rules(&self) -> &dyn SimulationRules {
        self.rules.as_ref()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance exactly one tick. Returns the number of updates applied.
    pub fn step(&mut self) -> usize {
        let applied = self.grid.update_grid(self.rules.as_mut());
        self.tick += 1;
        self.updates_applied += applied as u64;
        debug!(tick = self.tick, updates = applied, "tick complete");

        if self.metrics_interval > 0 && self.tick % self.metrics_interval == 0 {
            self.emit_population_metrics();
        }
        applied
    }

    /// Run the simulation for the specified number of ticks
    #[instrument(skip(self), fields(simulation = self.rules.name()))]
    pub fn run(&mut self, num_ticks: u64) -> SimulationResult {
        info!("Starting simulation for {} ticks", num_ticks);

        for _ in 0..num_ticks {
            self.step();
        }

        let result = self.collect_results();
        info!(
            event = "run_summary",
            total_ticks = result.total_ticks,
            updates_applied = result.updates_applied,
            "Simulation complete"
        );
        result
    }

    fn emit_population_metrics(&self) {
        let population = self.grid.population();
        info!(
            event = "population_metrics",
            tick = self.tick,
            population = ?population,
            "Population metrics snapshot"
        );
    }

    fn collect_results(&self) -> SimulationResult {
        SimulationResult {
            simulation: self.rules.name().to_string(),
            total_ticks: self.tick,
            updates_applied: self.updates_applied,
            population: self.grid.population(),
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub simulation: String,
    pub total_ticks: u64,
    pub updates_applied: u64,
    /// Cells per state at the end of the run
    pub population: BTreeMap<u32, usize>,
}
