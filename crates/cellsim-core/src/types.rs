//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Integer (row, col) position on the grid.
///
/// Coordinates are signed so that probes may step off the grid before an
/// edge strategy remaps or rejects them. Cells stored in a grid always carry
/// non-negative coordinates. Ordering is row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub row: i32,
    pub col: i32,
}

impl Location {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Step `distance` times along the direction `(d_row, d_col)`.
    pub fn step(&self, (d_row, d_col): (i32, i32), distance: i32) -> Self {
        self.offset(d_row * distance, d_col * distance)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(i32, i32)> for Location {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

/// How coordinates that fall off the grid are mapped back onto it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Off-grid coordinates stay off-grid and are rejected by bounds checks.
    #[default]
    Fixed,
    /// Coordinates wrap around to the opposite edge.
    Toroidal,
    /// Coordinates bounce off the edge.
    Mirror,
}

impl FromStr for EdgeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "finite" => Ok(EdgeKind::Fixed),
            "toroidal" | "torus" | "wrap" => Ok(EdgeKind::Toroidal),
            "mirror" | "reflect" => Ok(EdgeKind::Mirror),
            other => Err(Error::invalid_parameter(
                "edge",
                format!("unknown edge strategy '{}'", other),
            )),
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeKind::Fixed => "fixed",
            EdgeKind::Toroidal => "toroidal",
            EdgeKind::Mirror => "mirror",
        };
        f.write_str(name)
    }
}
