//! Granular falling sand between fixed walls.

use cellsim_core::{Location, Parameters, Result};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

use super::{seeded_rng, SimulationRules};
use crate::cell::{Cell, CellUpdate};
use crate::grid::Grid;

pub const EMPTY: u32 = 0;
pub const WALL: u32 = 1;
pub const SAND: u32 = 2;

#[derive(Debug, Clone)]
pub struct FallingSandRules {
    rng: ChaCha8Rng,
    parameters: Parameters,
}

impl FallingSandRules {
    pub fn new(params: &Parameters) -> Result<Self> {
        let mut parameters = Parameters::new();
        let rng = seeded_rng(params, &mut parameters)?;
        Ok(Self { rng, parameters })
    }

    /// Where a grain at `from` ends up, given the states settled so far.
    fn destination(&mut self, from: Location, states: &BTreeMap<Location, u32>) -> Location {
        let is_free = |loc: Location| states.get(&loc) == Some(&EMPTY);

        let below = from.offset(1, 0);
        if is_free(below) {
            return below;
        }

        match (is_free(from.offset(1, -1)), is_free(from.offset(1, 1))) {
            (true, true) if self.rng.gen_bool(0.5) => from.offset(1, -1),
            (true, true) => from.offset(1, 1),
            (true, false) => from.offset(1, -1),
            (false, true) => from.offset(1, 1),
            (false, false) => from,
        }
    }
}

impl SimulationRules for FallingSandRules {
    fn name(&self) -> &'static str {
        "sand"
    }

    fn number_of_states(&self) -> u32 {
        3
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn next_state(&mut self, cell: &Cell, _grid: &Grid) -> u32 {
        cell.state()
    }

    /// Grains settle bottom row first so a column of sand falls together.
    /// Edges never wrap: the floor and side walls of the grid are solid.
    fn next_states_for_all_cells(&mut self, grid: &Grid) -> Vec<CellUpdate> {
        let mut states: BTreeMap<Location, u32> =
            grid.iter().map(|c| (c.location(), c.state())).collect();

        for row in (0..grid.rows()).rev() {
            for col in 0..grid.cols() {
                let from = Location::new(row, col);
                if states.get(&from) != Some(&SAND) {
                    continue;
                }
                let to = self.destination(from, &states);
                if to != from {
                    states.insert(from, EMPTY);
                    states.insert(to, SAND);
                }
            }
        }

        grid.iter()
            .filter_map(|cell| {
                let state = states.get(&cell.location()).copied()?;
                (state != cell.state())
                    .then(|| CellUpdate::new(cell.location(), cell.with_state(state)))
            })
            .collect()
    }
}
