//! Rule sets driving the grid, one per simulation type.
//!
//! Rules whose next state is a pure function of a cell's neighborhood only
//! implement [`SimulationRules::next_state`]. Rules that move cells or
//! otherwise coordinate between cells override
//! [`SimulationRules::next_states_for_all_cells`] and resolve conflicts
//! within the pass themselves.

pub mod life;
pub mod percolation;
pub mod fire;
pub mod segregation;
pub mod wator;
pub mod falling_sand;
pub mod rock_paper_scissors;

pub use life::LifeRules;
pub use percolation::PercolationRules;
pub use fire::FireRules;
pub use segregation::SegregationRules;
pub use wator::WaTorRules;
pub use falling_sand::FallingSandRules;
pub use rock_paper_scissors::RockPaperScissorsRules;

use cellsim_core::{Error, Location, Parameters, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cell::{Cell, CellUpdate};
use crate::grid::Grid;

pub trait SimulationRules {
    /// Short identifier of the simulation type.
    fn name(&self) -> &'static str;

    /// Number of distinct states a cell can take.
    fn number_of_states(&self) -> u32;

    /// Effective parameters, including defaults that were filled in.
    fn parameters(&self) -> &Parameters;

    /// Next state of one cell, computed from the unmodified grid.
    fn next_state(&mut self, cell: &Cell, grid: &Grid) -> u32;

    /// Updates for one tick.
    ///
    /// The default visits every cell and keeps its attributes while
    /// replacing its state with [`SimulationRules::next_state`].
    fn next_states_for_all_cells(&mut self, grid: &Grid) -> Vec<CellUpdate> {
        let mut updates = Vec::with_capacity(grid.len());
        for cell in grid.iter() {
            let state = self.next_state(cell, grid);
            updates.push(CellUpdate::new(cell.location(), cell.with_state(state)));
        }
        updates
    }

    /// Build the initial cell for `state` at `location`.
    fn spawn(&self, state: u32, location: Location) -> Result<Cell> {
        if state >= self.number_of_states() {
            return Err(Error::invalid_parameter(
                "state",
                format!(
                    "{} is not a valid {} state (expected 0..{})",
                    state,
                    self.name(),
                    self.number_of_states()
                ),
            ));
        }
        Ok(Cell::new(state, location))
    }
}

/// Deterministic RNG from the optional `seed` parameter.
pub(crate) fn seeded_rng(params: &Parameters, effective: &mut Parameters) -> Result<ChaCha8Rng> {
    let seed = params.integer_in_range("seed", 0, i64::MAX, Some(0))?;
    effective.insert("seed", seed);
    Ok(ChaCha8Rng::seed_from_u64(seed as u64))
}
