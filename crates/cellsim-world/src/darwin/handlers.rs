//! Instruction handlers, one per opcode.
//!
//! Every handler reads and checks its arguments before touching the actor
//! or the tick context, so a failed instruction leaves no trace.

use cellsim_core::{Error, Location, Result};
use cellsim_ir::{Instruction, Opcode, Program};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

use super::context::{ClaimKind, Probe, TickContext};
use super::DarwinSettings;
use crate::cell::{Cell, Individual, Infection, EMPTY};
use crate::grid::Grid;

/// The individual currently executing, detached from the grid until its
/// instruction has run.
#[derive(Debug, Clone)]
pub(crate) struct Actor {
    pub species: u32,
    pub location: Location,
    pub individual: Individual,
    /// Zero-based instruction index when a jump was taken
    pub jump: Option<usize>,
}

impl Actor {
    pub fn new(species: u32, location: Location, individual: Individual) -> Self {
        Self {
            species,
            location,
            individual,
            jump: None,
        }
    }

    /// Position `distance` steps ahead along the current heading, unresolved.
    fn ahead(&self, distance: i32) -> Location {
        self.location.step(self.individual.heading(), distance)
    }
}

/// Everything a handler may read or change besides the actor itself.
pub(crate) struct Environment<'a> {
    pub grid: &'a Grid,
    pub context: &'a mut TickContext,
    pub rng: &'a mut ChaCha8Rng,
    pub settings: &'a DarwinSettings,
    pub templates: &'a BTreeMap<u32, Program>,
}

pub(crate) trait Handler: Sync {
    fn execute(
        &self,
        instruction: &Instruction,
        actor: &mut Actor,
        env: &mut Environment<'_>,
    ) -> Result<()>;
}

pub(crate) fn handler_for(opcode: Opcode) -> &'static dyn Handler {
    match opcode {
        Opcode::Move => &Move,
        Opcode::Left => &Turn { sign: 1 },
        Opcode::Right => &Turn { sign: -1 },
        Opcode::Infect => &Infect,
        Opcode::Go => &Go,
        Opcode::IfEmpty => &Branch { condition: Condition::Empty },
        Opcode::IfWall => &Branch { condition: Condition::Wall },
        Opcode::IfSame => &Branch { condition: Condition::Same },
        Opcode::IfEnemy => &Branch { condition: Condition::Enemy },
        Opcode::IfRandom => &Branch { condition: Condition::Random },
    }
}

/// A count argument: optional, defaulting to 1, never negative.
fn count_argument(instruction: &Instruction) -> Result<i32> {
    let count = instruction.int_argument_or(0, 1)?;
    if count < 0 {
        return Err(Error::InvalidArgument(format!(
            "'{}' needs a non-negative count",
            instruction
        )));
    }
    Ok(count)
}

/// A one-based jump target, returned as a zero-based instruction index.
fn jump_target(instruction: &Instruction, program: &Program) -> Result<usize> {
    let target = instruction.int_argument(0)?;
    if target < 1 || target as usize > program.len() {
        return Err(Error::InvalidArgument(format!(
            "'{}' jumps outside 1..={}",
            instruction,
            program.len()
        )));
    }
    Ok(target as usize - 1)
}

struct Move;

impl Handler for Move {
    fn execute(
        &self,
        instruction: &Instruction,
        actor: &mut Actor,
        env: &mut Environment<'_>,
    ) -> Result<()> {
        let steps = count_argument(instruction)?;
        let heading = actor.individual.heading();
        // Mirror and toroidal edges can lead back onto the path; the move ends there.
        let mut visited = BTreeSet::from([actor.location]);

        for _ in 0..steps {
            let Some(next) = env.grid.resolve(actor.location.step(heading, 1)) else {
                break;
            };
            if visited.contains(&next) {
                break;
            }
            let free = !env.context.is_unavailable(next) && env.grid.state_at(next) == Some(EMPTY);
            if !free {
                break;
            }
            actor.location = next;
            visited.insert(next);
        }
        Ok(())
    }
}

struct Turn {
    /// +1 turns counter-clockwise (left), -1 clockwise (right)
    sign: i32,
}

impl Handler for Turn {
    fn execute(
        &self,
        instruction: &Instruction,
        actor: &mut Actor,
        env: &mut Environment<'_>,
    ) -> Result<()> {
        let amount = count_argument(instruction)?;
        let degrees = (self.sign as i64)
            * (amount.rem_euclid(360) as i64)
            * (env.settings.orientation_step as i64);
        actor.individual.turn(degrees.rem_euclid(360) as i32);
        Ok(())
    }
}

struct Go;

impl Handler for Go {
    fn execute(
        &self,
        instruction: &Instruction,
        actor: &mut Actor,
        _env: &mut Environment<'_>,
    ) -> Result<()> {
        actor.jump = Some(jump_target(instruction, &actor.individual.program)?);
        Ok(())
    }
}

struct Infect;

impl Infect {
    /// Whether the cell at `location` can be converted by `actor` this tick.
    fn target(actor: &Actor, env: &Environment<'_>, location: Location) -> Option<Cell> {
        if env.context.is_vacating(location) {
            return None;
        }
        if let Some(claim) = env.context.claim(location) {
            if claim.kind != ClaimKind::Stayed {
                return None;
            }
        }
        let cell = env.context.current(env.grid, location)?;
        let individual = cell.as_individual();
        let eligible = !cell.is_empty()
            && cell.state() != actor.species
            && !individual.is_some_and(Individual::is_infected);
        eligible.then(|| cell.clone())
    }
}

impl Handler for Infect {
    fn execute(
        &self,
        instruction: &Instruction,
        actor: &mut Actor,
        env: &mut Environment<'_>,
    ) -> Result<()> {
        let reach = count_argument(instruction)?;

        let view: &Environment<'_> = env;
        let victim = (1..=reach)
            .filter_map(|distance| view.grid.resolve(actor.ahead(distance)))
            .find_map(|location| Self::target(actor, view, location));
        let Some(victim) = victim else {
            return Ok(());
        };

        let program = env
            .templates
            .get(&actor.species)
            .cloned()
            .unwrap_or_else(|| actor.individual.program.clone());
        let orientation = victim.as_individual().map_or(0, |i| i.orientation);
        let infection = Infection {
            countdown: env.settings.infection_time,
            previous_species: victim.state(),
        };

        trace!(
            from = %actor.location,
            target = %victim.location(),
            species = actor.species,
            previous_species = victim.state(),
            "infected"
        );
        env.context.occupy(
            Cell::individual(
                actor.species,
                victim.location(),
                Individual::infected(program, orientation, infection),
            ),
            ClaimKind::Infected,
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Empty,
    Wall,
    Same,
    Enemy,
    Random,
}

struct Branch {
    condition: Condition,
}

impl Branch {
    /// Scan up to `layers` positions ahead, stopping at the first wall.
    fn holds(&self, actor: &Actor, env: &mut Environment<'_>) -> bool {
        if self.condition == Condition::Random {
            return env.rng.gen_bool(0.5);
        }
        for distance in 1..=env.settings.layers as i32 {
            let probe = env.context.probe(env.grid, actor.ahead(distance));
            let matched = match (self.condition, probe) {
                (Condition::Empty, Probe::Empty) => true,
                (Condition::Wall, Probe::Wall) => true,
                (Condition::Same, Probe::Occupied(cell)) => cell.state() == actor.species,
                (Condition::Enemy, Probe::Occupied(cell)) => cell.state() != actor.species,
                _ => false,
            };
            if matched {
                return true;
            }
            if probe == Probe::Wall {
                break;
            }
        }
        false
    }
}

impl Handler for Branch {
    fn execute(
        &self,
        instruction: &Instruction,
        actor: &mut Actor,
        env: &mut Environment<'_>,
    ) -> Result<()> {
        let target = jump_target(instruction, &actor.individual.program)?;
        if self.holds(actor, env) {
            actor.jump = Some(target);
        }
        Ok(())
    }
}
