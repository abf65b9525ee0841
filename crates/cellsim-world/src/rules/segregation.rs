//! Schelling segregation: unsatisfied agents relocate to empty cells.

use cellsim_core::{Parameters, Result};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use super::{seeded_rng, SimulationRules};
use crate::cell::{Cell, CellUpdate, EMPTY};
use crate::grid::Grid;
use crate::neighbor::{NeighborPolicy, Topology};

#[derive(Debug, Clone)]
pub struct SegregationRules {
    /// Minimum fraction of same-type occupied neighbors for an agent to stay
    tolerance_threshold: f64,
    num_agent_types: u32,
    neighbors: NeighborPolicy,
    rng: ChaCha8Rng,
    parameters: Parameters,
}

impl SegregationRules {
    pub fn new(params: &Parameters) -> Result<Self> {
        let tolerance_threshold = params.probability("toleranceThreshold", None)?;
        let num_agent_types = params.integer_in_range("agentTypes", 1, 9, Some(2))? as u32;
        let neighbors = NeighborPolicy::from_parameters(params, Topology::Square8)?;

        let mut parameters = Parameters::new()
            .with("toleranceThreshold", tolerance_threshold)
            .with("agentTypes", num_agent_types as i64);
        neighbors.describe(&mut parameters);
        let rng = seeded_rng(params, &mut parameters)?;

        Ok(Self {
            tolerance_threshold,
            num_agent_types,
            neighbors,
            rng,
            parameters,
        })
    }

    /// An agent is satisfied when enough of its occupied neighbors share its
    /// type. With no occupied neighbors it is always satisfied.
    pub fn is_satisfied(&self, cell: &Cell, grid: &Grid) -> bool {
        let occupied: Vec<&Cell> = self
            .neighbors
            .neighbors(cell.location(), grid)
            .into_iter()
            .filter(|n| !n.is_empty())
            .collect();
        if occupied.is_empty() {
            return true;
        }
        let same = occupied.iter().filter(|n| n.state() == cell.state()).count();
        same as f64 / occupied.len() as f64 >= self.tolerance_threshold
    }
}

impl SimulationRules for SegregationRules {
    fn name(&self) -> &'static str {
        "segregation"
    }

    fn number_of_states(&self) -> u32 {
        self.num_agent_types + 1
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Relocation is resolved per pass; a single cell keeps its state.
    fn next_state(&mut self, cell: &Cell, _grid: &Grid) -> u32 {
        cell.state()
    }

    fn next_states_for_all_cells(&mut self, grid: &Grid) -> Vec<CellUpdate> {
        // Only cells empty before the tick are candidates, and each is handed
        // out once.
        let mut vacancies: Vec<Cell> = grid.iter().filter(|c| c.is_empty()).cloned().collect();
        let mut updates = Vec::new();

        for cell in grid.iter().filter(|c| c.state() != EMPTY) {
            if self.is_satisfied(cell, grid) {
                continue;
            }
            if vacancies.is_empty() {
                trace!(location = %cell.location(), "no vacancy left for unsatisfied agent");
                continue;
            }
            let vacancy = vacancies.swap_remove(self.rng.gen_range(0..vacancies.len()));
            updates.push(CellUpdate::new(vacancy.location(), cell.clone()));
            updates.push(CellUpdate::new(cell.location(), vacancy));
        }

        updates
    }
}
