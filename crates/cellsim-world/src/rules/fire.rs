//! Spreading of fire through a forest.

use cellsim_core::{Parameters, Result};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{seeded_rng, SimulationRules};
use crate::cell::Cell;
use crate::grid::Grid;
use crate::neighbor::{NeighborPolicy, Topology};

pub const EMPTY: u32 = 0;
pub const TREE: u32 = 1;
pub const BURNING: u32 = 2;

#[derive(Debug, Clone)]
pub struct FireRules {
    /// Probability an empty cell grows a tree
    grow_in_empty_cell: f64,
    /// Probability a tree with no burning neighbor catches fire
    ignition_without_neighbors: f64,
    neighbors: NeighborPolicy,
    rng: ChaCha8Rng,
    parameters: Parameters,
}

impl FireRules {
    pub fn new(params: &Parameters) -> Result<Self> {
        let grow_in_empty_cell = params.probability("growInEmptyCell", None)?;
        let ignition_without_neighbors = params.probability("ignitionWithoutNeighbors", None)?;
        let neighbors = NeighborPolicy::from_parameters(params, Topology::Square4)?;

        let mut parameters = Parameters::new()
            .with("growInEmptyCell", grow_in_empty_cell)
            .with("ignitionWithoutNeighbors", ignition_without_neighbors);
        neighbors.describe(&mut parameters);
        let rng = seeded_rng(params, &mut parameters)?;

        Ok(Self {
            grow_in_empty_cell,
            ignition_without_neighbors,
            neighbors,
            rng,
            parameters,
        })
    }
}

impl SimulationRules for FireRules {
    fn name(&self) -> &'static str {
        "fire"
    }

    fn number_of_states(&self) -> u32 {
        3
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn next_state(&mut self, cell: &Cell, grid: &Grid) -> u32 {
        match cell.state() {
            BURNING => EMPTY,
            EMPTY if self.rng.gen::<f64>() < self.grow_in_empty_cell => TREE,
            TREE if self.neighbors.count_in_state(cell.location(), grid, BURNING) > 0 => BURNING,
            TREE if self.rng.gen::<f64>() < self.ignition_without_neighbors => BURNING,
            state => state,
        }
    }
}
