//! 2D grid holding the cells of one simulation.

use cellsim_core::{EdgeKind, Error, Location, Result};
use std::collections::BTreeMap;
use tracing::trace;

use crate::cell::{Cell, CellUpdate};
use crate::edge::EdgeStrategy;
use crate::rules::SimulationRules;

/// A sparse rectangular grid of cells.
///
/// A position holds at most one cell. Positions without a cell are
/// logically empty; rules can only replace cells that already exist, so
/// grids are normally populated once at creation with [`Grid::filled`].
/// Iteration is row-major.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: i32,
    cols: i32,
    edge: EdgeKind,
    cells: BTreeMap<Location, Cell>,
}

impl Grid {
    /// An empty grid. `rows` and `cols` must both be positive; run
    /// configurations are checked by `RunConfig::validate` before they get here.
    pub fn new(rows: i32, cols: i32, edge: EdgeKind) -> Self {
        debug_assert!(
            rows > 0 && cols > 0,
            "grid dimensions must be positive, got {}x{}",
            rows,
            cols
        );
        Self {
            rows,
            cols,
            edge,
            cells: BTreeMap::new(),
        }
    }

    /// Create a grid with a cell at every position.
    pub fn filled(
        rows: i32,
        cols: i32,
        edge: EdgeKind,
        mut make_cell: impl FnMut(Location) -> Cell,
    ) -> Self {
        let mut grid = Self::new(rows, cols, edge);
        for row in 0..rows {
            for col in 0..cols {
                grid.add_cell(make_cell(Location::new(row, col)));
            }
        }
        grid
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn edge(&self) -> EdgeKind {
        self.edge
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, location: Location) -> bool {
        (0..self.rows).contains(&location.row) && (0..self.cols).contains(&location.col)
    }

    /// Remap a probe through this grid's edge strategy.
    pub fn adjust(&self, location: Location) -> Location {
        self.edge.adjust_coordinate(location, self.rows, self.cols)
    }

    /// Remap a probe and keep it only if it lands on the grid.
    pub fn resolve(&self, location: Location) -> Option<Location> {
        let adjusted = self.adjust(location);
        self.in_bounds(adjusted).then_some(adjusted)
    }

    /// Cell at `(row, col)`.
    ///
    /// `Ok(None)` means the position is on the grid but holds no cell; an
    /// off-grid coordinate is an [`Error::OutOfBounds`].
    pub fn cell(&self, row: i32, col: i32) -> Result<Option<&Cell>> {
        let location = Location::new(row, col);
        if !self.in_bounds(location) {
            return Err(Error::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.cells.get(&location))
    }

    /// Cell at `location`, `None` when absent or off the grid.
    pub fn cell_at(&self, location: Location) -> Option<&Cell> {
        self.cells.get(&location)
    }

    pub fn state_at(&self, location: Location) -> Option<u32> {
        self.cell_at(location).map(Cell::state)
    }

    /// Place a new cell. Returns false, leaving the grid untouched, when the
    /// position is off the grid or already holds a cell.
    pub fn add_cell(&mut self, cell: Cell) -> bool {
        let location = cell.location();
        if !self.in_bounds(location) || self.cells.contains_key(&location) {
            return false;
        }
        self.cells.insert(location, cell);
        true
    }

    /// Replace the cell at the new cell's position. Positions that never
    /// held a cell are left alone.
    pub fn update_cell(&mut self, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(&cell.location()) {
            *slot = cell;
        } else {
            trace!(location = %cell.location(), "ignoring update for unpopulated position");
        }
    }

    /// Advance one tick: compute every update from the current snapshot,
    /// then apply them all. Returns the number of updates applied.
    pub fn update_grid<R: SimulationRules + ?Sized>(&mut self, rules: &mut R) -> usize {
        let updates = rules.next_states_for_all_cells(self);
        self.apply(updates)
    }

    pub fn apply(&mut self, updates: Vec<CellUpdate>) -> usize {
        let count = updates.len();
        for update in updates {
            self.update_cell(update.into_cell());
        }
        count
    }

    /// Iterator over all cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }

    /// Iterator over all populated positions
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.cells.keys().copied()
    }

    /// Number of cells in each state.
    pub fn population(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for cell in self.cells.values() {
            *counts.entry(cell.state()).or_insert(0) += 1;
        }
        counts
    }

    pub fn count_state(&self, state: u32) -> usize {
        self.cells.values().filter(|c| c.state() == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::filled(4, 6, EdgeKind::Fixed, Cell::empty);
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.cols(), 6);
        assert_eq!(grid.len(), 24);
        assert_eq!(grid.population().get(&0), Some(&24));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "grid dimensions must be positive")]
    fn test_rejects_empty_dimensions() {
        Grid::new(0, 3, EdgeKind::Toroidal);
    }

    #[test]
    fn test_missing_versus_out_of_bounds() {
        let mut grid = Grid::new(3, 3, EdgeKind::Fixed);
        assert!(grid.cell(1, 1).unwrap().is_none());
        assert!(matches!(grid.cell(3, 0), Err(Error::OutOfBounds { .. })));
        assert!(matches!(grid.cell(0, -1), Err(Error::OutOfBounds { .. })));

        let cell = Cell::new(2, Location::new(1, 1));
        assert!(grid.add_cell(cell.clone()));
        assert_eq!(grid.cell(1, 1).unwrap(), Some(&cell));
    }

    #[test]
    fn test_add_cell_never_overwrites() {
        let mut grid = Grid::new(3, 3, EdgeKind::Fixed);
        assert!(grid.add_cell(Cell::new(1, Location::new(0, 0))));
        assert!(!grid.add_cell(Cell::new(2, Location::new(0, 0))));
        assert!(!grid.add_cell(Cell::new(2, Location::new(5, 0))));
        assert!(!grid.add_cell(Cell::new(2, Location::new(-1, 0))));

        assert_eq!(grid.len(), 1);
        assert_eq!(grid.state_at(Location::new(0, 0)), Some(1));
    }

    #[test]
    fn test_update_cell_only_replaces() {
        let mut grid = Grid::new(3, 3, EdgeKind::Fixed);
        grid.add_cell(Cell::new(1, Location::new(0, 0)));

        grid.update_cell(Cell::new(2, Location::new(0, 0)));
        grid.update_cell(Cell::new(2, Location::new(1, 1)));

        assert_eq!(grid.state_at(Location::new(0, 0)), Some(2));
        assert!(grid.cell(1, 1).unwrap().is_none());
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_resolve_uses_edge_strategy() {
        let fixed = Grid::new(3, 3, EdgeKind::Fixed);
        let torus = Grid::new(3, 3, EdgeKind::Toroidal);
        let probe = Location::new(-1, 0);

        assert_eq!(fixed.resolve(probe), None);
        assert_eq!(torus.resolve(probe), Some(Location::new(2, 0)));
    }

    #[test]
    fn test_iteration_is_row_major() {
        let grid = Grid::filled(2, 2, EdgeKind::Fixed, Cell::empty);
        let order: Vec<Location> = grid.locations().collect();
        assert_eq!(
            order,
            vec![
                Location::new(0, 0),
                Location::new(0, 1),
                Location::new(1, 0),
                Location::new(1, 1),
            ]
        );
    }
}
