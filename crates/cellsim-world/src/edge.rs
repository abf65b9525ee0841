//! Boundary handling: mapping off-grid coordinates back onto the grid.

use cellsim_core::{EdgeKind, Location};

/// Pure coordinate remap applied to every neighbor or movement probe.
pub trait EdgeStrategy {
    fn adjust_coordinate(&self, point: Location, rows: i32, cols: i32) -> Location;
}

/// Leaves coordinates untouched; callers reject anything off the grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedEdgeStrategy;

/// Wraps coordinates around to the opposite edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToroidalEdgeStrategy;

/// Reflects coordinates off the edge they crossed.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorEdgeStrategy;

impl EdgeStrategy for FixedEdgeStrategy {
    fn adjust_coordinate(&self, point: Location, _rows: i32, _cols: i32) -> Location {
        point
    }
}

impl EdgeStrategy for ToroidalEdgeStrategy {
    fn adjust_coordinate(&self, point: Location, rows: i32, cols: i32) -> Location {
        Location::new(
            ((point.row % rows) + rows) % rows,
            ((point.col % cols) + cols) % cols,
        )
    }
}

impl EdgeStrategy for MirrorEdgeStrategy {
    fn adjust_coordinate(&self, point: Location, rows: i32, cols: i32) -> Location {
        Location::new(reflect(point.row, rows), reflect(point.col, cols))
    }
}

// A single bounce; probes further out than one grid length stay off-grid.
fn reflect(value: i32, size: i32) -> i32 {
    if value < 0 {
        -value
    } else if value >= size {
        2 * size - value - 2
    } else {
        value
    }
}

impl EdgeStrategy for EdgeKind {
    fn adjust_coordinate(&self, point: Location, rows: i32, cols: i32) -> Location {
        match self {
            EdgeKind::Fixed => FixedEdgeStrategy.adjust_coordinate(point, rows, cols),
            EdgeKind::Toroidal => ToroidalEdgeStrategy.adjust_coordinate(point, rows, cols),
            EdgeKind::Mirror => MirrorEdgeStrategy.adjust_coordinate(point, rows, cols),
        }
    }
}
