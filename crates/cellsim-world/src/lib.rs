//! Cellular automata simulation engine.
//!
//! A [`Grid`] holds immutable [`Cell`] values. Each tick a [`SimulationRules`]
//! implementation computes a list of [`CellUpdate`]s from the frozen grid and
//! the grid then applies them all at once. Every rule set except Darwin reads
//! only that frozen snapshot, so its result does not depend on the order in
//! which cells are visited. Darwin resolves movement and infection as it
//! walks the grid in row-major order and is order-dependent.

pub mod cell;
pub mod edge;
pub mod neighbor;
pub mod grid;
pub mod rules;
pub mod darwin;
pub mod registry;
pub mod simulation;

pub use cell::{Attributes, Cell, CellUpdate, Creature, Individual, Infection};
pub use edge::{EdgeStrategy, FixedEdgeStrategy, MirrorEdgeStrategy, ToroidalEdgeStrategy};
pub use grid::Grid;
pub use neighbor::{NeighborPolicy, Topology};
pub use rules::SimulationRules;
pub use darwin::DarwinRules;
pub use registry::SimulationKind;
pub use simulation::{Simulation, SimulationResult};
