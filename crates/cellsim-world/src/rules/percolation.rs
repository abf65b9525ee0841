//! Percolation: fluid entering from the top row fills connected open cells.

use cellsim_core::{Parameters, Result};

use super::SimulationRules;
use crate::cell::Cell;
use crate::grid::Grid;
use crate::neighbor::{NeighborPolicy, Topology};

pub const BLOCKED: u32 = 0;
pub const OPEN: u32 = 1;
pub const FILLED: u32 = 2;

#[derive(Debug, Clone)]
pub struct PercolationRules {
    neighbors: NeighborPolicy,
    parameters: Parameters,
}

impl PercolationRules {
    pub fn new(params: &Parameters) -> Result<Self> {
        let neighbors = NeighborPolicy::from_parameters(params, Topology::Square4)?;
        let mut parameters = Parameters::new();
        neighbors.describe(&mut parameters);
        Ok(Self {
            neighbors,
            parameters,
        })
    }
}

impl SimulationRules for PercolationRules {
    fn name(&self) -> &'static str {
        "percolation"
    }

    fn number_of_states(&self) -> u32 {
        3
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn next_state(&mut self, cell: &Cell, grid: &Grid) -> u32 {
        match cell.state() {
            OPEN if cell.row() == 0 => FILLED,
            OPEN if self.neighbors.count_in_state(cell.location(), grid, FILLED) > 0 => FILLED,
            // Filled and blocked cells never change.
            state => state,
        }
    }
}

/// True once any cell in the bottom row is filled.
pub fn percolates(grid: &Grid) -> bool {
    grid.iter()
        .any(|cell| cell.row() == grid.rows() - 1 && cell.state() == FILLED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{grid_from, states_of};
    use cellsim_core::EdgeKind;

    #[test]
    fn test_top_row_fills_in_one_step() {
        let mut grid = grid_from(&["101", "111", "000"], EdgeKind::Fixed);
        let mut rules = PercolationRules::new(&Parameters::new()).unwrap();

        grid.update_grid(&mut rules);
        assert_eq!(states_of(&grid), vec!["202", "111", "000"]);

        grid.update_grid(&mut rules);
        assert_eq!(states_of(&grid), vec!["202", "212", "000"]);
    }

    #[test]
    fn test_filled_is_terminal() {
        let mut grid = grid_from(&["2", "0"], EdgeKind::Fixed);
        let mut rules = PercolationRules::new(&Parameters::new()).unwrap();
        for _ in 0..5 {
            grid.update_grid(&mut rules);
            assert_eq!(states_of(&grid), vec!["2", "0"]);
        }
    }

    #[test]
    fn test_flow_follows_open_path() {
        let mut grid = grid_from(&["0100", "0110", "0010", "0011"], EdgeKind::Fixed);
        let mut rules = PercolationRules::new(&Parameters::new()).unwrap();

        for _ in 0..3 {
            grid.update_grid(&mut rules);
        }
        assert!(!percolates(&grid));

        for _ in 0..3 {
            grid.update_grid(&mut rules);
        }
        assert!(percolates(&grid));
        assert_eq!(states_of(&grid), vec!["0200", "0220", "0020", "0022"]);
    }
}
