//! Cell values and the deltas that replace them.

use cellsim_core::Location;
use cellsim_ir::Program;
use serde::{Deserialize, Serialize};

/// State shared by every simulation for a position nobody occupies.
pub const EMPTY: u32 = 0;

/// An immutable cell: a state at a location, plus whatever extra
/// attributes the rule set that created it needs.
///
/// Cells are never changed in place. Rules build a new value with
/// [`Cell::with_state`], [`Cell::moved_to`] or one of the constructors and
/// hand it to the grid inside a [`CellUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    state: u32,
    location: Location,
    attributes: Attributes,
}

/// Rule-specific data carried by a cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Attributes {
    #[default]
    Plain,
    /// Predator-prey individual
    Creature(Creature),
    /// Darwin individual running its own program
    Individual(Individual),
}

/// Energy and breeding counters for a predator-prey individual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    /// Remaining health; sharks starve when it reaches zero
    pub energy: i32,
    /// Ticks since this individual last reproduced
    pub breed_timer: u32,
}

impl Creature {
    pub fn new(energy: i32) -> Self {
        Self {
            energy,
            breed_timer: 0,
        }
    }
}

/// Execution state of one Darwin individual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Heading in degrees, counter-clockwise from east, normalized to [0, 360)
    pub orientation: i32,
    /// Zero-based index of the next instruction
    pub program_counter: usize,
    pub infection: Option<Infection>,
    /// This individual's own copy of its species program
    pub program: Program,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infection {
    /// Ticks left before the individual reverts
    pub countdown: u32,
    /// Species to revert to
    pub previous_species: u32,
}

impl Individual {
    pub fn new(program: Program, orientation: i32) -> Self {
        Self {
            orientation: orientation.rem_euclid(360),
            program_counter: 0,
            infection: None,
            program,
        }
    }

    pub fn infected(program: Program, orientation: i32, infection: Infection) -> Self {
        Self {
            infection: Some(infection),
            ..Self::new(program, orientation)
        }
    }

    pub fn is_infected(&self) -> bool {
        self.infection.is_some()
    }

    pub fn turn(&mut self, degrees: i32) {
        self.orientation = (self.orientation as i64 + degrees as i64).rem_euclid(360) as i32;
    }

    /// Unit step `(d_row, d_col)` for the current orientation.
    ///
    /// Angles snap to the nearest of the eight compass directions; 90 degrees
    /// points up the grid (towards row 0).
    pub fn heading(&self) -> (i32, i32) {
        let radians = (self.orientation as f64).to_radians();
        let d_row = -radians.sin().round() as i32;
        let d_col = radians.cos().round() as i32;
        (d_row, d_col)
    }
}

impl Cell {
    pub fn new(state: u32, location: Location) -> Self {
        Self {
            state,
            location,
            attributes: Attributes::Plain,
        }
    }

    pub fn empty(location: Location) -> Self {
        Self::new(EMPTY, location)
    }

    pub fn creature(state: u32, location: Location, creature: Creature) -> Self {
        Self {
            state,
            location,
            attributes: Attributes::Creature(creature),
        }
    }

    pub fn individual(state: u32, location: Location, individual: Individual) -> Self {
        Self {
            state,
            location,
            attributes: Attributes::Individual(individual),
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn row(&self) -> i32 {
        self.location.row
    }

    pub fn col(&self) -> i32 {
        self.location.col
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.state == EMPTY
    }

    pub fn as_creature(&self) -> Option<&Creature> {
        match &self.attributes {
            Attributes::Creature(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_individual(&self) -> Option<&Individual> {
        match &self.attributes {
            Attributes::Individual(i) => Some(i),
            _ => None,
        }
    }

    /// Same location and attributes, new state.
    pub fn with_state(&self, state: u32) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    /// Same state and attributes at another location.
    pub fn moved_to(&self, location: Location) -> Self {
        Self {
            location,
            ..self.clone()
        }
    }
}

/// The next cell for one position, produced while computing a tick and
/// consumed when the grid applies it.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    location: Location,
    next_cell: Cell,
}

impl CellUpdate {
    /// The stored cell is always relocated to `location`.
    pub fn new(location: Location, next_cell: Cell) -> Self {
        let next_cell = if next_cell.location == location {
            next_cell
        } else {
            next_cell.moved_to(location)
        };
        Self {
            location,
            next_cell,
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn next_cell(&self) -> &Cell {
        &self.next_cell
    }

    pub fn into_cell(self) -> Cell {
        self.next_cell
    }
}
