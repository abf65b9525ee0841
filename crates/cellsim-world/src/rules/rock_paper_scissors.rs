//! Cyclic dominance: every state is beaten by the next one.

use cellsim_core::{Parameters, Result};

use super::SimulationRules;
use crate::cell::Cell;
use crate::grid::Grid;
use crate::neighbor::{NeighborPolicy, Topology};

#[derive(Debug, Clone)]
pub struct RockPaperScissorsRules {
    num_states: u32,
    /// Beating neighbors needed to convert a cell
    threshold: usize,
    neighbors: NeighborPolicy,
    parameters: Parameters,
}

impl RockPaperScissorsRules {
    pub fn new(params: &Parameters) -> Result<Self> {
        let num_states = params.integer_in_range("numStates", 2, 10, Some(3))? as u32;
        let threshold = params.integer_in_range("threshold", 1, 96, Some(3))? as usize;
        let neighbors = NeighborPolicy::from_parameters(params, Topology::Square8)?;

        let mut parameters = Parameters::new()
            .with("numStates", num_states as i64)
            .with("threshold", threshold as i64);
        neighbors.describe(&mut parameters);

        Ok(Self {
            num_states,
            threshold,
            neighbors,
            parameters,
        })
    }

    /// The state that beats `state`.
    pub fn predator_of(&self, state: u32) -> u32 {
        (state + 1) % self.num_states
    }
}

impl SimulationRules for RockPaperScissorsRules {
    fn name(&self) -> &'static str {
        "rps"
    }

    fn number_of_states(&self) -> u32 {
        self.num_states
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn next_state(&mut self, cell: &Cell, grid: &Grid) -> u32 {
        let predator = self.predator_of(cell.state());
        if self.neighbors.count_in_state(cell.location(), grid, predator) >= self.threshold {
            predator
        } else {
            cell.state()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{grid_from, states_of};
    use cellsim_core::EdgeKind;

    #[test]
    fn test_predator_cycle() {
        let rules = RockPaperScissorsRules::new(&Parameters::new()).unwrap();
        assert_eq!(rules.predator_of(0), 1);
        assert_eq!(rules.predator_of(2), 0);
        assert_eq!(rules.number_of_states(), 3);
    }

    #[test]
    fn test_conversion_needs_threshold() {
        let params = Parameters::new().with("threshold", 2.0);
        let mut rules = RockPaperScissorsRules::new(&params).unwrap();
        let mut grid = grid_from(&["110", "000", "200"], EdgeKind::Fixed);

        grid.update_grid(&mut rules);
        // (1,0) and (1,1) each touch two 1s; (0,2) and (1,2) only one. The 2
        // in the corner is surrounded by three 0s.
        assert_eq!(states_of(&grid), vec!["110", "110", "000"]);
    }
}
