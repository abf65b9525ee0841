//! Neighbor topologies.

use cellsim_core::{Error, Location, Parameters, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cell::Cell;
use crate::grid::Grid;

const SQUARE_4: [(i32, i32); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

const SQUARE_8: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// Flat-topped hexes in columns, odd columns shifted half a cell down. The two
// vertical neighbors are the same for every column.
const HEX_EVEN_COL: [(i32, i32); 6] = [(-1, 0), (-1, -1), (-1, 1), (0, -1), (0, 1), (1, 0)];
const HEX_ODD_COL: [(i32, i32); 6] = [(-1, 0), (0, -1), (0, 1), (1, -1), (1, 1), (1, 0)];

// Twelve neighbors sharing an edge or a vertex. An upward triangle touches
// three cells in the row above and five below; a downward one the reverse.
const TRIANGLE_UP: [(i32, i32); 12] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -2),
    (0, -1),
    (0, 1),
    (0, 2),
    (1, -2),
    (1, -1),
    (1, 0),
    (1, 1),
    (1, 2),
];
const TRIANGLE_DOWN: [(i32, i32); 12] = [
    (-1, -2),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (-1, 2),
    (0, -2),
    (0, -1),
    (0, 1),
    (0, 2),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Tessellation used to enumerate neighbor offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Von Neumann neighborhood
    Square4,
    /// Moore neighborhood
    Square8,
    Hex,
    Triangle,
}

impl Topology {
    /// Offsets for the cell at `(row, col)`; hex and triangle sets depend on parity.
    pub fn directions(&self, row: i32, col: i32) -> &'static [(i32, i32)] {
        match self {
            Topology::Square4 => &SQUARE_4,
            Topology::Square8 => &SQUARE_8,
            Topology::Hex if col.rem_euclid(2) == 0 => &HEX_EVEN_COL,
            Topology::Hex => &HEX_ODD_COL,
            Topology::Triangle if (row + col).rem_euclid(2) == 0 => &TRIANGLE_UP,
            Topology::Triangle => &TRIANGLE_DOWN,
        }
    }
}

impl FromStr for Topology {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "square4" | "vonneumann" | "4" => Ok(Topology::Square4),
            "square8" | "square" | "moore" | "8" => Ok(Topology::Square8),
            "hex" | "hexagon" => Ok(Topology::Hex),
            "triangle" => Ok(Topology::Triangle),
            other => Err(Error::invalid_parameter(
                "neighborhood",
                format!("unknown neighborhood '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Topology::Square4 => "square4",
            Topology::Square8 => "square8",
            Topology::Hex => "hex",
            Topology::Triangle => "triangle",
        };
        f.write_str(name)
    }
}

/// A topology plus how many rings of it count as neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborPolicy {
    pub topology: Topology,
    pub layers: u32,
    /// Drop the rest of a layer once one of its probes leaves the grid,
    /// instead of dropping only that probe.
    pub truncate_layer_at_edge: bool,
}

impl NeighborPolicy {
    pub fn new(topology: Topology, layers: u32) -> Self {
        Self {
            topology,
            layers,
            truncate_layer_at_edge: false,
        }
    }

    pub fn with_layer_truncation(mut self, truncate: bool) -> Self {
        self.truncate_layer_at_edge = truncate;
        self
    }

    pub fn square4() -> Self {
        Self::new(Topology::Square4, 1)
    }

    pub fn square8() -> Self {
        Self::new(Topology::Square8, 1)
    }

    /// Read the optional `neighborhood`, `layers` and `truncateLayerAtEdge`
    /// parameters.
    pub fn from_parameters(params: &Parameters, default_topology: Topology) -> Result<Self> {
        let topology = match params.get("neighborhood") {
            Some(value) => value.to_string().parse()?,
            None => default_topology,
        };
        let layers = params.integer_in_range("layers", 1, 16, Some(1))? as u32;
        let truncate = params.integer_in_range("truncateLayerAtEdge", 0, 1, Some(0))? == 1;
        Ok(Self::new(topology, layers).with_layer_truncation(truncate))
    }

    /// Record the effective settings in a rule's parameter map.
    pub fn describe(&self, params: &mut Parameters) {
        params.insert("neighborhood", self.topology.to_string());
        params.insert("layers", self.layers as i64);
        params.insert("truncateLayerAtEdge", self.truncate_layer_at_edge as i64);
    }

    pub fn directions(&self, row: i32, col: i32) -> &'static [(i32, i32)] {
        self.topology.directions(row, col)
    }

    /// In-grid positions around `location`, after edge remapping.
    ///
    /// Layer `i` scales every offset by `i`. Probes that land off the grid
    /// are dropped. With `truncate_layer_at_edge` set, the first off-grid
    /// probe also drops every remaining direction of that layer, so cells
    /// near a fixed edge see an order-dependent subset of their neighbors.
    pub fn neighbor_locations(&self, location: Location, grid: &Grid) -> Vec<Location> {
        let directions = self.directions(location.row, location.col);
        let mut found = Vec::with_capacity(directions.len() * self.layers as usize);

        for layer in 1..=self.layers as i32 {
            for &direction in directions {
                match grid.resolve(location.step(direction, layer)) {
                    Some(probe) => found.push(probe),
                    None if self.truncate_layer_at_edge => break,
                    None => continue,
                }
            }
        }

        found
    }

    /// Cells present at the neighbor positions of `location`.
    pub fn neighbors<'g>(&self, location: Location, grid: &'g Grid) -> Vec<&'g Cell> {
        self.neighbor_locations(location, grid)
            .into_iter()
            .filter_map(|probe| grid.cell_at(probe))
            .collect()
    }

    /// Number of present neighbors holding `state`.
    pub fn count_in_state(&self, location: Location, grid: &Grid, state: u32) -> usize {
        self.neighbors(location, grid)
            .iter()
            .filter(|cell| cell.state() == state)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsim_core::EdgeKind;

    fn full_grid(rows: i32, cols: i32, edge: EdgeKind) -> Grid {
        Grid::filled(rows, cols, edge, Cell::empty)
    }

    #[test]
    fn test_interior_neighbor_counts() {
        let grid = full_grid(7, 7, EdgeKind::Fixed);
        let center = Location::new(3, 3);

        assert_eq!(NeighborPolicy::square4().neighbors(center, &grid).len(), 4);
        assert_eq!(NeighborPolicy::square8().neighbors(center, &grid).len(), 8);
        assert_eq!(NeighborPolicy::new(Topology::Hex, 1).neighbors(center, &grid).len(), 6);
        assert_eq!(NeighborPolicy::new(Topology::Triangle, 1).neighbors(center, &grid).len(), 12);
        assert_eq!(NeighborPolicy::new(Topology::Square8, 2).neighbors(center, &grid).len(), 16);
    }

    #[test]
    fn test_absent_positions_are_excluded() {
        let mut grid = Grid::new(3, 3, EdgeKind::Fixed);
        grid.add_cell(Cell::new(1, Location::new(1, 1)));
        grid.add_cell(Cell::new(1, Location::new(0, 1)));

        let neighbors = NeighborPolicy::square8().neighbors(Location::new(1, 1), &grid);
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].location(), Location::new(0, 1));
    }

    #[test]
    fn test_off_grid_positions_are_dropped() {
        let grid = full_grid(5, 5, EdgeKind::Fixed);
        let policy = NeighborPolicy::square8();

        assert_eq!(policy.neighbors(Location::new(0, 0), &grid).len(), 3);
        assert_eq!(policy.neighbors(Location::new(0, 2), &grid).len(), 5);
        assert_eq!(policy.neighbors(Location::new(4, 4), &grid).len(), 3);
    }

    #[test]
    fn test_layer_truncation_stops_at_first_off_grid_probe() {
        let grid = full_grid(5, 5, EdgeKind::Fixed);
        let policy = NeighborPolicy::square8().with_layer_truncation(true);

        // (-1, -1) is the first Moore offset, so a top-left corner sees nothing.
        assert!(policy.neighbors(Location::new(0, 0), &grid).is_empty());

        // Bottom-right corner: (-1, 1) is the third offset and leaves the grid.
        assert_eq!(policy.neighbors(Location::new(4, 4), &grid).len(), 2);

        // Two layers from the center of a 5x5 grid: the second layer reaches
        // the border exactly and stays whole.
        let policy = NeighborPolicy::new(Topology::Square8, 2).with_layer_truncation(true);
        assert_eq!(policy.neighbors(Location::new(2, 2), &grid).len(), 16);
        assert_eq!(policy.neighbors(Location::new(1, 2), &grid).len(), 8);
    }

    #[test]
    fn test_toroidal_edges_keep_full_neighborhood() {
        let grid = full_grid(5, 5, EdgeKind::Toroidal);
        let neighbors = NeighborPolicy::square8().neighbor_locations(Location::new(0, 0), &grid);
        assert_eq!(neighbors.len(), 8);
        assert!(neighbors.contains(&Location::new(4, 4)));
    }

    #[test]
    fn test_parity_dependent_directions() {
        assert_ne!(Topology::Hex.directions(0, 0), Topology::Hex.directions(0, 1));
        assert_ne!(Topology::Triangle.directions(0, 0), Topology::Triangle.directions(0, 1));
        assert_eq!(Topology::Triangle.directions(1, 1), Topology::Triangle.directions(0, 0));
    }

    #[test]
    fn test_policy_from_parameters() {
        let params = Parameters::new()
            .with("neighborhood", "hex")
            .with("layers", 2.0)
            .with("truncateLayerAtEdge", 1.0);
        let policy = NeighborPolicy::from_parameters(&params, Topology::Square8).unwrap();
        assert_eq!(policy, NeighborPolicy::new(Topology::Hex, 2).with_layer_truncation(true));

        let policy = NeighborPolicy::from_parameters(&Parameters::new(), Topology::Square4).unwrap();
        assert_eq!(policy, NeighborPolicy::square4());

        let params = Parameters::new().with("neighborhood", "octagon");
        assert!(NeighborPolicy::from_parameters(&params, Topology::Square8).is_err());
    }
}
