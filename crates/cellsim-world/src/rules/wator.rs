//! WaTor predator-prey dynamics between fish and sharks.

use cellsim_core::{Error, Location, Parameters, Result};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

use super::{seeded_rng, SimulationRules};
use crate::cell::{Cell, CellUpdate, Creature};
use crate::grid::Grid;
use crate::neighbor::{NeighborPolicy, Topology};

pub const EMPTY: u32 = 0;
pub const FISH: u32 = 1;
pub const SHARK: u32 = 2;

#[derive(Debug, Clone)]
pub struct WaTorRules {
    fish_breed_time: u32,
    shark_breed_time: u32,
    shark_start_energy: i32,
    energy_from_fish: i32,
    neighbors: NeighborPolicy,
    rng: ChaCha8Rng,
    parameters: Parameters,
}

/// Working state for one tick.
#[derive(Default)]
struct Pass {
    next: BTreeMap<Location, Cell>,
    /// Positions already promised to a mover or newborn this tick
    claimed: BTreeSet<Location>,
    eaten: BTreeSet<Location>,
}

impl WaTorRules {
    pub fn new(params: &Parameters) -> Result<Self> {
        let fish_breed_time = params.integer_in_range("fishBreedTime", 1, 10_000, Some(3))? as u32;
        let shark_breed_time =
            params.integer_in_range("sharkBreedTime", 1, 10_000, Some(10))? as u32;
        let shark_start_energy =
            params.integer_in_range("sharkStartEnergy", 1, 10_000, Some(5))? as i32;
        let energy_from_fish = params.integer_in_range("energyFromFish", 0, 10_000, Some(2))? as i32;
        let neighbors = NeighborPolicy::from_parameters(params, Topology::Square4)?;

        let mut parameters = Parameters::new()
            .with("fishBreedTime", fish_breed_time as i64)
            .with("sharkBreedTime", shark_breed_time as i64)
            .with("sharkStartEnergy", shark_start_energy as i64)
            .with("energyFromFish", energy_from_fish as i64);
        neighbors.describe(&mut parameters);
        let rng = seeded_rng(params, &mut parameters)?;

        Ok(Self {
            fish_breed_time,
            shark_breed_time,
            shark_start_energy,
            energy_from_fish,
            neighbors,
            rng,
            parameters,
        })
    }

    fn newborn(&self, state: u32) -> Creature {
        match state {
            SHARK => Creature::new(self.shark_start_energy),
            _ => Creature::new(0),
        }
    }

    /// Counters of an individual; cells placed without them start fresh.
    fn creature_of(&self, cell: &Cell) -> Creature {
        cell.as_creature()
            .copied()
            .unwrap_or_else(|| self.newborn(cell.state()))
    }

    fn breed_time(&self, state: u32) -> u32 {
        match state {
            SHARK => self.shark_breed_time,
            _ => self.fish_breed_time,
        }
    }

    fn pick(&mut self, candidates: &[Location]) -> Option<Location> {
        candidates.choose(&mut self.rng).copied()
    }

    /// Snapshot-empty neighbors nobody has claimed yet.
    fn free_neighbors(&self, location: Location, grid: &Grid, pass: &Pass) -> Vec<Location> {
        self.neighbors
            .neighbor_locations(location, grid)
            .into_iter()
            .filter(|l| grid.state_at(*l) == Some(EMPTY) && !pass.claimed.contains(l))
            .collect()
    }

    fn act_shark(&mut self, shark: &Cell, grid: &Grid, pass: &mut Pass) {
        let origin = shark.location();
        let mut creature = self.creature_of(shark);
        creature.breed_timer += 1;

        let prey: Vec<Location> = self
            .neighbors
            .neighbor_locations(origin, grid)
            .into_iter()
            .filter(|l| {
                grid.state_at(*l) == Some(FISH)
                    && !pass.eaten.contains(l)
                    && !pass.claimed.contains(l)
            })
            .collect();

        let destination = match self.pick(&prey) {
            Some(fish) => {
                pass.eaten.insert(fish);
                creature.energy += self.energy_from_fish;
                fish
            }
            None => {
                let free = self.free_neighbors(origin, grid, pass);
                self.pick(&free).unwrap_or(origin)
            }
        };

        creature.energy -= 1;
        pass.claimed.insert(destination);

        if creature.energy <= 0 {
            trace!(location = %origin, "shark starved");
            pass.next.insert(origin, Cell::empty(origin));
            pass.next.insert(destination, Cell::empty(destination));
            return;
        }

        self.settle(SHARK, origin, destination, creature, pass);
    }

    fn act_fish(&mut self, fish: &Cell, grid: &Grid, pass: &mut Pass) {
        let origin = fish.location();
        let mut creature = self.creature_of(fish);
        creature.breed_timer += 1;

        let free = self.free_neighbors(origin, grid, pass);
        let destination = self.pick(&free).unwrap_or(origin);
        pass.claimed.insert(destination);

        self.settle(FISH, origin, destination, creature, pass);
    }

    /// Place a surviving individual, leaving a newborn behind when it moved
    /// with a full breeding counter.
    fn settle(
        &self,
        state: u32,
        origin: Location,
        destination: Location,
        mut creature: Creature,
        pass: &mut Pass,
    ) {
        if destination != origin {
            if creature.breed_timer >= self.breed_time(state) {
                creature.breed_timer = 0;
                pass.claimed.insert(origin);
                pass.next
                    .insert(origin, Cell::creature(state, origin, self.newborn(state)));
            } else {
                pass.next.insert(origin, Cell::empty(origin));
            }
        }
        pass.next
            .insert(destination, Cell::creature(state, destination, creature));
    }
}

impl SimulationRules for WaTorRules {
    fn name(&self) -> &'static str {
        "wator"
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

    fn next_states_for_all_cells(&mut self, grid: &Grid) -> Vec<CellUpdate> {
        let mut pass = Pass {
            next: grid.iter().map(|c| (c.location(), c.clone())).collect(),
            ..Pass::default()
        };

        for shark in grid.iter().filter(|c| c.state() == SHARK) {
            self.act_shark(shark, grid, &mut pass);
        }
        for fish in grid.iter().filter(|c| c.state() == FISH) {
            if pass.eaten.contains(&fish.location()) {
                continue;
            }
            self.act_fish(fish, grid, &mut pass);
        }

        pass.next
            .into_values()
            .filter(|cell| grid.cell_at(cell.location()) != Some(cell))
            .map(|cell| CellUpdate::new(cell.location(), cell))
            .collect()
    }

    fn spawn(&self, state: u32, location: Location) -> Result<Cell> {
        match state {
            EMPTY => Ok(Cell::empty(location)),
            FISH | SHARK => Ok(Cell::creature(state, location, self.newborn(state))),
            _ => Err(Error::invalid_parameter(
                "state",
                format!("{} is not a valid wator state (expected 0..3)", state),
            )),
        }
    }
}
