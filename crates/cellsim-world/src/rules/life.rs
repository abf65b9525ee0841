//! Life-like automata described by a birth/survival rule string.

use cellsim_core::{Error, Parameters, Result};
use std::collections::BTreeSet;

use super::SimulationRules;
use crate::cell::Cell;
use crate::grid::Grid;
use crate::neighbor::{NeighborPolicy, Topology};

pub const DEAD: u32 = 0;
pub const ALIVE: u32 = 1;

pub const DEFAULT_RULE: &str = "B3/S23";

/// Outer-totalistic two-state automaton such as Conway's Life ("B3/S23").
#[derive(Debug, Clone)]
pub struct LifeRules {
    birth: BTreeSet<usize>,
    survive: BTreeSet<usize>,
    neighbors: NeighborPolicy,
    parameters: Parameters,
}

impl LifeRules {
    pub fn new(params: &Parameters) -> Result<Self> {
        let rule = params.text_or("rule", DEFAULT_RULE);
        let (birth, survive) = parse_rule(&rule)?;
        let neighbors = NeighborPolicy::from_parameters(params, Topology::Square8)?;

        let mut parameters = Parameters::new().with("rule", rule.to_ascii_uppercase());
        neighbors.describe(&mut parameters);

        Ok(Self {
            birth,
            survive,
            neighbors,
            parameters,
        })
    }

    /// Conway's Life, "B3/S23", on the Moore neighborhood.
    pub fn conway() -> Self {
        let neighbors = NeighborPolicy::square8();
        let mut parameters = Parameters::new().with("rule", DEFAULT_RULE);
        neighbors.describe(&mut parameters);
        Self {
            birth: BTreeSet::from([3]),
            survive: BTreeSet::from([2, 3]),
            neighbors,
            parameters,
        }
    }

    pub fn birth(&self) -> &BTreeSet<usize> {
        &self.birth
    }

    pub fn survive(&self) -> &BTreeSet<usize> {
        &self.survive
    }
}

/// Parse `B<digits>/S<digits>` (either order, case-insensitive).
pub fn parse_rule(rule: &str) -> Result<(BTreeSet<usize>, BTreeSet<usize>)> {
    let invalid = |reason: String| Error::invalid_parameter("rule", reason);

    let mut birth = None;
    let mut survive = None;

    for part in rule.trim().split('/') {
        let part = part.trim();
        let mut chars = part.chars();
        let target = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('B') => &mut birth,
            Some('S') => &mut survive,
            _ => return Err(invalid(format!("'{}' must start with B or S", part))),
        };
        if target.is_some() {
            return Err(invalid(format!("'{}' repeats a section", rule)));
        }
        let counts = chars
            .map(|c| {
                c.to_digit(10)
                    .filter(|d| *d <= 8)
                    .map(|d| d as usize)
                    .ok_or_else(|| invalid(format!("'{}' is not a neighbor count in '{}'", c, rule)))
            })
            .collect::<Result<BTreeSet<usize>>>()?;
        *target = Some(counts);
    }

    match (birth, survive) {
        (Some(birth), Some(survive)) => Ok((birth, survive)),
        _ => Err(invalid(format!("'{}' needs both a B and an S section", rule))),
    }
}

impl SimulationRules for LifeRules {
    fn name(&self) -> &'static str {
        "life"
    }

    fn number_of_states(&self) -> u32 {
        2
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn next_state(&mut self, cell: &Cell, grid: &Grid) -> u32 {
        let alive_neighbors = self.neighbors.count_in_state(cell.location(), grid, ALIVE);
        match cell.state() {
            DEAD if self.birth.contains(&alive_neighbors) => ALIVE,
            ALIVE if !self.survive.contains(&alive_neighbors) => DEAD,
            state => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{grid_from, states_of};
    use cellsim_core::{EdgeKind, Location};

    #[test]
    fn test_parse_rule() {
        let (birth, survive) = parse_rule("B36/S23").unwrap();
        assert_eq!(birth.into_iter().collect::<Vec<_>>(), vec![3, 6]);
        assert_eq!(survive.into_iter().collect::<Vec<_>>(), vec![2, 3]);

        let (birth, survive) = parse_rule("s/b2").unwrap();
        assert!(survive.is_empty());
        assert!(birth.contains(&2));

        assert!(parse_rule("B3").is_err());
        assert!(parse_rule("B9/S23").is_err());
        assert!(parse_rule("23/3").is_err());
        assert!(LifeRules::new(&Parameters::new().with("rule", "X")).is_err());
    }

    #[test]
    fn test_conway_matches_default_rule() {
        let parsed = LifeRules::new(&Parameters::new()).unwrap();
        let conway = LifeRules::conway();
        assert_eq!(parsed.birth(), conway.birth());
        assert_eq!(parsed.survive(), conway.survive());
        assert_eq!(parsed.parameters(), conway.parameters());
    }

    #[test]
    fn test_birth_requires_exact_count() {
        let grid = grid_from(
            &["00000", "00100", "01010", "00100", "00000"],
            EdgeKind::Fixed,
        );
        let mut rules = LifeRules::conway();
        let center = grid.cell(2, 2).unwrap().unwrap().clone();
        assert_eq!(center.location(), Location::new(2, 2));
        assert_eq!(rules.next_state(&center, &grid), DEAD);
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut grid = grid_from(&["00000", "00000", "01110", "00000", "00000"], EdgeKind::Fixed);
        let mut rules = LifeRules::conway();

        grid.update_grid(&mut rules);
        assert_eq!(states_of(&grid), vec!["00000", "00100", "00100", "00100", "00000"]);

        grid.update_grid(&mut rules);
        assert_eq!(states_of(&grid), vec!["00000", "00000", "01110", "00000", "00000"]);
    }

    #[test]
    fn test_block_survives_in_corner() {
        let mut grid = grid_from(&["1100", "1100", "0000"], EdgeKind::Fixed);
        let mut rules = LifeRules::conway();
        grid.update_grid(&mut rules);
        assert_eq!(states_of(&grid), vec!["1100", "1100", "0000"]);
    }

    #[test]
    fn test_glider_wraps_on_torus() {
        let start = ["01000", "00100", "11100", "00000", "00000"];
        let mut grid = grid_from(&start, EdgeKind::Toroidal);
        let mut rules = LifeRules::conway();

        // A glider returns to its shape shifted by (1, 1) every 4 ticks; on a
        // 5x5 torus it is back where it started after 20.
        for _ in 0..20 {
            grid.update_grid(&mut rules);
        }
        assert_eq!(states_of(&grid), start.to_vec());
        assert_eq!(grid.count_state(ALIVE), 5);
    }
}
