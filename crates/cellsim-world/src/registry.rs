//! Lookup from a simulation type name to its rule set.

use cellsim_core::{Error, Location, Parameters, Result};
use cellsim_ir::Program;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::cell::Cell;
use crate::darwin::DarwinRules;
use crate::rules::{
    FallingSandRules, FireRules, LifeRules, PercolationRules, RockPaperScissorsRules,
    SegregationRules, SimulationRules, WaTorRules,
};

/// Every simulation type this crate can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationKind {
    Life,
    Percolation,
    Fire,
    Segregation,
    WaTor,
    FallingSand,
    RockPaperScissors,
    Darwin,
}

impl SimulationKind {
    pub const ALL: [SimulationKind; 8] = [
        SimulationKind::Life,
        SimulationKind::Percolation,
        SimulationKind::Fire,
        SimulationKind::Segregation,
        SimulationKind::WaTor,
        SimulationKind::FallingSand,
        SimulationKind::RockPaperScissors,
        SimulationKind::Darwin,
    ];

    /// Canonical name, identical to [`SimulationRules::name`] of the built rules.
    pub fn name(&self) -> &'static str {
        match self {
            SimulationKind::Life => "life",
            SimulationKind::Percolation => "percolation",
            SimulationKind::Fire => "fire",
            SimulationKind::Segregation => "segregation",
            SimulationKind::WaTor => "wator",
            SimulationKind::FallingSand => "sand",
            SimulationKind::RockPaperScissors => "rps",
            SimulationKind::Darwin => "darwin",
        }
    }

    /// Validate `params` and construct the rule set.
    ///
    /// `species` maps Darwin states to their programs and is ignored by the
    /// other kinds.
    pub fn build_rules(
        &self,
        params: &Parameters,
        species: &BTreeMap<u32, Program>,
    ) -> Result<Box<dyn SimulationRules>> {
        let rules: Box<dyn SimulationRules> = match self {
            SimulationKind::Life => Box::new(LifeRules::new(params)?),
            SimulationKind::Percolation => Box::new(PercolationRules::new(params)?),
            SimulationKind::Fire => Box::new(FireRules::new(params)?),
            SimulationKind::Segregation => Box::new(SegregationRules::new(params)?),
            SimulationKind::WaTor => Box::new(WaTorRules::new(params)?),
            SimulationKind::FallingSand => Box::new(FallingSandRules::new(params)?),
            SimulationKind::RockPaperScissors => Box::new(RockPaperScissorsRules::new(params)?),
            SimulationKind::Darwin => Box::new(DarwinRules::new(params, species.clone())?),
        };
        Ok(rules)
    }

    /// The cell `rules` places at `location` for an initial `state`.
    pub fn initial_cell(
        &self,
        rules: &dyn SimulationRules,
        state: u32,
        location: Location,
    ) -> Result<Cell> {
        if rules.name() != self.name() {
            return Err(Error::Validation(format!(
                "{} rules cannot place cells for a {} simulation",
                rules.name(),
                self.name()
            )));
        }
        rules.spawn(state, location)
    }
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimulationKind {
    type Err = Error;

    /// Case, spaces, dashes and underscores are ignored, so "Game of Life"
    /// and "game_of_life" both name [`SimulationKind::Life`].
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "life" | "gameoflife" | "conway" => Ok(SimulationKind::Life),
            "percolation" => Ok(SimulationKind::Percolation),
            "fire" | "spreadingoffire" => Ok(SimulationKind::Fire),
            "segregation" | "schelling" => Ok(SimulationKind::Segregation),
            "wator" | "predatorprey" => Ok(SimulationKind::WaTor),
            "sand" | "fallingsand" => Ok(SimulationKind::FallingSand),
            "rps" | "rockpaperscissors" => Ok(SimulationKind::RockPaperScissors),
            "darwin" => Ok(SimulationKind::Darwin),
            _ => Err(Error::UnknownSimulation(s.to_string())),
        }
    }
}
