//! Darwin: every individual runs its species program, one instruction per tick.
//!
//! Unlike the other rule sets a Darwin tick is not a pure function of the
//! snapshot. Individuals act in row-major order and each one sees what the
//! individuals before it decided: positions they moved into or infected are
//! final for the tick, and positions they left cannot be entered until the
//! next tick.

pub mod context;
mod handlers;

use cellsim_core::{Error, Location, Parameters, Result};
use cellsim_ir::{validate_program, Program};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

use crate::cell::{Cell, CellUpdate, Individual};
use crate::grid::Grid;
use crate::rules::{seeded_rng, SimulationRules};
use context::{ClaimKind, TickContext};
use handlers::{handler_for, Actor, Environment};

/// Tunables shared by every individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DarwinSettings {
    /// Ticks an infected individual runs its infector's program
    pub infection_time: u32,
    /// Positions scanned ahead by the IF instructions
    pub layers: u32,
    /// Degrees per unit of LEFT/RIGHT argument
    pub orientation_step: i32,
    pub initial_orientation: i32,
}

impl DarwinSettings {
    pub fn from_parameters(params: &Parameters) -> Result<Self> {
        Ok(Self {
            infection_time: params.integer_in_range("infectionTime", 0, 100_000, Some(5))? as u32,
            layers: params.integer_in_range("layers", 1, 16, Some(1))? as u32,
            orientation_step: params.integer_in_range("orientationStep", -360, 360, Some(1))?
                as i32,
            initial_orientation: params.integer_in_range("initialOrientation", 0, 359, Some(0))?
                as i32,
        })
    }

    fn describe(&self, params: &mut Parameters) {
        params.insert("infectionTime", self.infection_time as i64);
        params.insert("layers", self.layers as i64);
        params.insert("orientationStep", self.orientation_step as i64);
        params.insert("initialOrientation", self.initial_orientation as i64);
    }
}

#[derive(Debug, Clone)]
pub struct DarwinRules {
    settings: DarwinSettings,
    /// Template program of each species, keyed by its state
    species: BTreeMap<u32, Program>,
    rng: ChaCha8Rng,
    parameters: Parameters,
}

impl DarwinRules {
    pub fn new(params: &Parameters, species: BTreeMap<u32, Program>) -> Result<Self> {
        if species.contains_key(&0) {
            return Err(Error::invalid_parameter(
                "species",
                "state 0 is reserved for empty cells",
            ));
        }
        for (id, program) in &species {
            if let Err(e) = validate_program(program) {
                warn!(species = id, error = %e, "species program will fail at runtime");
            }
        }

        let settings = DarwinSettings::from_parameters(params)?;
        let mut parameters = Parameters::new();
        settings.describe(&mut parameters);
        let rng = seeded_rng(params, &mut parameters)?;

        debug!(species = species.len(), ?settings, "darwin rules ready");

        Ok(Self {
            settings,
            species,
            rng,
            parameters,
        })
    }

    pub fn settings(&self) -> &DarwinSettings {
        &self.settings
    }

    pub fn species(&self) -> &BTreeMap<u32, Program> {
        &self.species
    }

    /// A new individual of `species` starting at its first instruction.
    fn fresh(&self, species: u32, orientation: i32) -> Individual {
        let program = self.species.get(&species).cloned().unwrap_or_default();
        Individual::new(program, orientation)
    }

    /// Count down an infection, reverting to the original species once it
    /// runs out.
    fn advance_infection(&self, actor: &mut Actor) {
        let Some(infection) = actor.individual.infection.as_mut() else {
            return;
        };
        if infection.countdown == 0 {
            let species = infection.previous_species;
            trace!(location = %actor.location, species, "infection wore off");
            actor.individual = self.fresh(species, actor.individual.orientation);
            actor.species = species;
        } else {
            infection.countdown -= 1;
        }
    }

    /// Run the current instruction. Problems are logged and leave the actor
    /// as it was.
    fn execute(&mut self, actor: &mut Actor, grid: &Grid, context: &mut TickContext) {
        let pc = actor.individual.program_counter;
        let Some(instruction) = actor.individual.program.get(pc).cloned() else {
            debug!(location = %actor.location, species = actor.species, "no instruction to run");
            return;
        };
        let opcode = match instruction.opcode() {
            Ok(opcode) => opcode,
            Err(e) => {
                warn!(location = %actor.location, error = %e, "skipping instruction");
                return;
            }
        };

        let mut env = Environment {
            grid,
            context,
            rng: &mut self.rng,
            settings: &self.settings,
            templates: &self.species,
        };
        if let Err(e) = handler_for(opcode).execute(&instruction, actor, &mut env) {
            warn!(
                location = %actor.location,
                species = actor.species,
                instruction = %instruction,
                error = %e,
                "instruction failed"
            );
        }
    }
}

impl SimulationRules for DarwinRules {
    fn name(&self) -> &'static str {
        "darwin"
    }

    fn number_of_states(&self) -> u32 {
        self.species.keys().next_back().map_or(1, |max| max + 1)
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn next_state(&mut self, cell: &Cell, _grid: &Grid) -> u32 {
        cell.state()
    }

    fn next_states_for_all_cells(&mut self, grid: &Grid) -> Vec<CellUpdate> {
        let mut context = TickContext::new();

        for cell in grid.iter() {
            let origin = cell.location();
            if cell.is_empty() || context.is_finalized(origin) {
                continue;
            }

            let individual = match cell.as_individual() {
                Some(individual) => individual.clone(),
                None => self.fresh(cell.state(), self.settings.initial_orientation),
            };
            let mut actor = Actor::new(cell.state(), origin, individual);

            self.advance_infection(&mut actor);
            self.execute(&mut actor, grid, &mut context);

            let program = &actor.individual.program;
            actor.individual.program_counter = match actor.jump {
                Some(target) => target,
                None => program.next_index(actor.individual.program_counter),
            };

            let kind = if actor.location == origin {
                ClaimKind::Stayed
            } else {
                context.vacate(origin);
                ClaimKind::Arrived
            };
            context.occupy(
                Cell::individual(actor.species, actor.location, actor.individual),
                kind,
            );
        }

        context.into_updates()
    }

    fn spawn(&self, state: u32, location: Location) -> Result<Cell> {
        if state == 0 {
            return Ok(Cell::empty(location));
        }
        if !self.species.contains_key(&state) {
            return Err(Error::invalid_parameter(
                "state",
                format!("no species program for state {}", state),
            ));
        }
        Ok(Cell::individual(
            state,
            location,
            self.fresh(state, self.settings.initial_orientation),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Infection;
    use cellsim_core::EdgeKind;

    fn rules(params: Parameters, programs: &[(u32, &str)]) -> DarwinRules {
        let species = programs
            .iter()
            .map(|(id, text)| (*id, Program::parse(text)))
            .collect();
        DarwinRules::new(&params, species).unwrap()
    }

    /// Empty grid with individuals placed at `(state, (row, col), orientation)`.
    fn world(rules: &DarwinRules, size: i32, placements: &[(u32, (i32, i32), i32)]) -> Grid {
        let mut grid = Grid::filled(size, size, EdgeKind::Fixed, Cell::empty);
        for (state, (row, col), orientation) in placements {
            let location = Location::new(*row, *col);
            let program = rules.species()[state].clone();
            grid.update_cell(Cell::individual(
                *state,
                location,
                Individual::new(program, *orientation),
            ));
        }
        grid
    }

    fn individual_at(grid: &Grid, row: i32, col: i32) -> Individual {
        grid.cell_at(Location::new(row, col))
            .and_then(Cell::as_individual)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_move_two_vacates_origin() {
        let mut rules = rules(Parameters::new(), &[(1, "MOVE 2\nLEFT 90")]);
        let mut grid = world(&rules, 5, &[(1, (2, 2), 0)]);

        grid.update_grid(&mut rules);

        assert!(grid.cell_at(Location::new(2, 2)).unwrap().is_empty());
        assert_eq!(grid.state_at(Location::new(2, 4)), Some(1));
        assert_eq!(individual_at(&grid, 2, 4).program_counter, 1);
        assert_eq!(grid.count_state(1), 1);
    }

    #[test]
    fn test_huge_turn_arguments_complete_the_tick() {
        let params = Parameters::new().with("orientationStep", 360i64);
        let mut rules = rules(params, &[(1, "RIGHT 10000000"), (2, "LEFT 2147483647")]);
        let mut grid = world(&rules, 3, &[(1, (0, 0), 90), (2, (2, 2), 90)]);

        grid.update_grid(&mut rules);

        assert_eq!(individual_at(&grid, 0, 0).orientation, 90);
        assert_eq!(individual_at(&grid, 2, 2).orientation, 90);
        assert_eq!(individual_at(&grid, 2, 2).program_counter, 0);
    }

    #[test]
    fn test_two_movers_never_share_a_cell() {
        let mut rules = rules(Parameters::new(), &[(1, "MOVE 1")]);
        let mut grid = world(&rules, 3, &[(1, (0, 0), 0), (1, (0, 2), 180)]);

        grid.update_grid(&mut rules);

        assert_eq!(grid.state_at(Location::new(0, 1)), Some(1));
        assert_eq!(grid.state_at(Location::new(0, 2)), Some(1));
        assert_eq!(grid.count_state(1), 2);
    }

    #[test]
    fn test_vacated_cell_is_not_reused_in_the_same_tick() {
        let mut rules = rules(Parameters::new(), &[(1, "MOVE 1")]);
        let mut grid = world(&rules, 3, &[(1, (0, 1), 180), (1, (0, 2), 180)]);

        grid.update_grid(&mut rules);
        assert_eq!(grid.state_at(Location::new(0, 0)), Some(1));
        assert_eq!(grid.state_at(Location::new(0, 1)), Some(0));
        assert_eq!(grid.state_at(Location::new(0, 2)), Some(1));

        grid.update_grid(&mut rules);
        assert_eq!(grid.state_at(Location::new(0, 1)), Some(1));
    }

    #[test]
    fn test_go_jumps_to_one_based_target() {
        let mut rules = rules(Parameters::new(), &[(1, "GO 3\nLEFT 90\nRIGHT 90")]);
        let mut grid = world(&rules, 3, &[(1, (1, 1), 0)]);

        grid.update_grid(&mut rules);
        let individual = individual_at(&grid, 1, 1);
        assert_eq!(individual.program_counter, 2);
        assert_eq!(individual.orientation, 0);

        grid.update_grid(&mut rules);
        let individual = individual_at(&grid, 1, 1);
        assert_eq!(individual.orientation, 270);
        assert_eq!(individual.program_counter, 0);
    }

    #[test]
    fn test_untaken_branch_advances() {
        let mut rules = rules(Parameters::new(), &[(1, "IFWALL 3\nMOVE 1\nLEFT 90")]);
        let mut grid = world(&rules, 3, &[(1, (1, 1), 0), (1, (0, 2), 0)]);

        grid.update_grid(&mut rules);
        // (0,2) faces the east edge and jumps; (1,1) sees open ground.
        assert_eq!(individual_at(&grid, 0, 2).program_counter, 2);
        assert_eq!(individual_at(&grid, 1, 1).program_counter, 1);
    }

    #[test]
    fn test_bad_instructions_still_advance() {
        let mut rules = rules(
            Parameters::new(),
            &[(1, "MOVE x\nJUMP 1\nGO 9\nLEFT 90")],
        );
        let mut grid = world(&rules, 3, &[(1, (1, 1), 0)]);

        for expected_pc in 1..=3 {
            grid.update_grid(&mut rules);
            let individual = individual_at(&grid, 1, 1);
            assert_eq!(individual.program_counter, expected_pc);
            assert_eq!(individual.orientation, 0);
        }
    }

    #[test]
    fn test_infection_and_reversion() {
        let params = Parameters::new().with("infectionTime", 1.0);
        let mut rules = rules(params, &[(1, "INFECT 1"), (2, "MOVE 1")]);
        let mut grid = world(&rules, 5, &[(1, (2, 2), 0), (2, (2, 3), 0)]);

        // Tick 1: converted before it gets to move.
        grid.update_grid(&mut rules);
        assert_eq!(grid.state_at(Location::new(2, 3)), Some(1));
        let infected = individual_at(&grid, 2, 3);
        assert_eq!(
            infected.infection,
            Some(Infection {
                countdown: 1,
                previous_species: 2
            })
        );
        assert_eq!(infected.program, rules.species()[&1]);

        // Tick 2: runs the infector's program, countdown reaches zero.
        grid.update_grid(&mut rules);
        assert_eq!(grid.state_at(Location::new(2, 3)), Some(1));
        assert_eq!(individual_at(&grid, 2, 3).infection.map(|i| i.countdown), Some(0));

        // Tick 3: back to species 2, which moves immediately.
        grid.update_grid(&mut rules);
        assert_eq!(grid.state_at(Location::new(2, 3)), Some(0));
        assert_eq!(grid.state_at(Location::new(2, 4)), Some(2));
        let reverted = individual_at(&grid, 2, 4);
        assert!(!reverted.is_infected());
        assert_eq!(reverted.program_counter, 0);
    }

    #[test]
    fn test_infected_individuals_are_immune() {
        let mut rules = rules(Parameters::new(), &[(1, "INFECT 1"), (3, "INFECT 1")]);
        let mut grid = world(&rules, 3, &[(1, (0, 0), 0), (3, (0, 1), 0), (3, (0, 2), 180)]);

        grid.update_grid(&mut rules);
        // (0,0) converts (0,1); (0,2) cannot convert it back in the same tick.
        assert_eq!(grid.state_at(Location::new(0, 1)), Some(1));
        assert!(individual_at(&grid, 0, 1).is_infected());
        assert_eq!(grid.state_at(Location::new(0, 2)), Some(3));
    }

    #[test]
    fn test_programs_are_per_individual() {
        let rules = rules(Parameters::new(), &[(1, "MOVE 1")]);
        let cell = rules.spawn(1, Location::new(0, 0)).unwrap();
        assert_eq!(
            cell.as_individual().map(|i| &i.program),
            Some(&rules.species()[&1])
        );
        assert!(rules.spawn(2, Location::new(0, 0)).is_err());
        assert!(rules.spawn(0, Location::new(0, 0)).unwrap().is_empty());
        assert_eq!(rules.number_of_states(), 2);
    }

    #[test]
    fn test_species_zero_is_rejected() {
        let species = BTreeMap::from([(0, Program::parse("MOVE 1"))]);
        assert!(DarwinRules::new(&Parameters::new(), species).is_err());
    }
}
