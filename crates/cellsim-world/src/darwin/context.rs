//! Bookkeeping shared by all individuals during one Darwin tick.

use cellsim_core::Location;
use std::collections::{BTreeMap, BTreeSet};

use crate::cell::{Cell, CellUpdate};
use crate::grid::Grid;

/// How a position came to be finalized this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    /// The individual already there acted and did not move
    Stayed,
    /// An individual moved in
    Arrived,
    /// The occupant was converted by an infection
    Infected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub cell: Cell,
    pub kind: ClaimKind,
}

/// What an individual sees when it looks at a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe<'a> {
    /// Off the grid, or a position that holds no cell
    Wall,
    Empty,
    Occupied(&'a Cell),
}

/// Positions finalized so far this tick plus the ones left behind by movers.
///
/// A vacated position stays unavailable until the next tick, so a mover can
/// never step into a cell another individual is leaving.
#[derive(Debug, Default)]
pub struct TickContext {
    occupied: BTreeMap<Location, Claim>,
    vacating: BTreeSet<Location>,
}

impl TickContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the position already has its final occupant for this tick.
    pub fn is_finalized(&self, location: Location) -> bool {
        self.occupied.contains_key(&location)
    }

    pub fn claim(&self, location: Location) -> Option<&Claim> {
        self.occupied.get(&location)
    }

    pub fn is_vacating(&self, location: Location) -> bool {
        self.vacating.contains(&location)
    }

    /// True when nobody may move into `location` this tick.
    pub fn is_unavailable(&self, location: Location) -> bool {
        self.is_finalized(location) || self.is_vacating(location)
    }

    pub fn occupy(&mut self, cell: Cell, kind: ClaimKind) {
        self.occupied.insert(cell.location(), Claim { cell, kind });
    }

    pub fn vacate(&mut self, location: Location) {
        self.vacating.insert(location);
    }

    /// The cell currently at `location`: its finalized occupant if there is
    /// one, otherwise whatever the grid held before the tick.
    pub fn current<'a>(&'a self, grid: &'a Grid, location: Location) -> Option<&'a Cell> {
        match self.occupied.get(&location) {
            Some(claim) => Some(&claim.cell),
            None => grid.cell_at(location),
        }
    }

    /// Look at an unresolved probe position through the grid's edges.
    pub fn probe<'a>(&'a self, grid: &'a Grid, location: Location) -> Probe<'a> {
        let Some(resolved) = grid.resolve(location) else {
            return Probe::Wall;
        };
        if self.is_vacating(resolved) && !self.is_finalized(resolved) {
            return Probe::Empty;
        }
        match self.current(grid, resolved) {
            None => Probe::Wall,
            Some(cell) if cell.is_empty() => Probe::Empty,
            Some(cell) => Probe::Occupied(cell),
        }
    }

    /// Updates for every finalized position and an empty cell for every
    /// position that was left behind.
    pub fn into_updates(self) -> Vec<CellUpdate> {
        let Self { occupied, vacating } = self;
        let mut updates: Vec<CellUpdate> = vacating
            .into_iter()
            .filter(|location| !occupied.contains_key(location))
            .map(|location| CellUpdate::new(location, Cell::empty(location)))
            .collect();
        updates.extend(
            occupied
                .into_iter()
                .map(|(location, claim)| CellUpdate::new(location, claim.cell)),
        );
        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsim_core::EdgeKind;

    #[test]
    fn test_view_sees_claims_and_vacancies() {
        let mut grid = Grid::filled(1, 3, EdgeKind::Fixed, Cell::empty);
        grid.update_cell(Cell::new(1, Location::new(0, 0)));
        let mut context = TickContext::new();

        assert_eq!(context.probe(&grid, Location::new(0, -1)), Probe::Wall);
        assert!(matches!(context.probe(&grid, Location::new(0, 0)), Probe::Occupied(_)));

        context.vacate(Location::new(0, 0));
        context.occupy(Cell::new(1, Location::new(0, 1)), ClaimKind::Arrived);

        assert_eq!(context.probe(&grid, Location::new(0, 0)), Probe::Empty);
        assert!(matches!(
            context.probe(&grid, Location::new(0, 1)),
            Probe::Occupied(cell) if cell.state() == 1
        ));
        assert!(context.is_unavailable(Location::new(0, 0)));
        assert!(context.is_unavailable(Location::new(0, 1)));
        assert!(!context.is_unavailable(Location::new(0, 2)));
    }

    #[test]
    fn test_unpopulated_position_is_a_wall() {
        let grid = Grid::new(2, 2, EdgeKind::Fixed);
        let context = TickContext::new();
        assert_eq!(context.probe(&grid, Location::new(1, 1)), Probe::Wall);
    }

    #[test]
    fn test_updates_cover_moves() {
        let mut context = TickContext::new();
        context.vacate(Location::new(0, 0));
        context.occupy(Cell::new(2, Location::new(0, 1)), ClaimKind::Arrived);

        let updates = context.into_updates();
        assert_eq!(updates.len(), 2);
        assert!(updates[0].next_cell().is_empty());
        assert_eq!(updates[0].location(), Location::new(0, 0));
        assert_eq!(updates[1].next_cell().state(), 2);
    }
}
