//! Configuration types for the simulation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::types::EdgeKind;

/// A single named simulation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Text(String),
}

impl ParameterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(v) => Some(*v),
            ParameterValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Number(v) => write!(f, "{}", v),
            ParameterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Number(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Number(value as f64)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Text(value)
    }
}

/// Named parameters handed to a rule set at construction time.
///
/// Every accessor that validates a value reports failures as
/// [`Error::InvalidParameter`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters {
    values: BTreeMap<String, ParameterValue>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<ParameterValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<ParameterValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Required numeric parameter.
    pub fn number(&self, name: &str) -> Result<f64> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| Error::invalid_parameter(name, "missing required parameter"))?;
        value
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| Error::invalid_parameter(name, format!("'{}' is not a number", value)))
    }

    /// Numeric parameter falling back to `default` when absent.
    pub fn number_or(&self, name: &str, default: f64) -> Result<f64> {
        if self.contains(name) {
            self.number(name)
        } else {
            Ok(default)
        }
    }

    /// Numeric parameter within `[min, max]`. `default` is used when the
    /// parameter is absent; `None` makes it required.
    pub fn number_in_range(
        &self,
        name: &str,
        min: f64,
        max: f64,
        default: Option<f64>,
    ) -> Result<f64> {
        let value = match default {
            Some(default) => self.number_or(name, default)?,
            None => self.number(name)?,
        };
        if value < min || value > max {
            return Err(Error::invalid_parameter(
                name,
                format!("{} is outside the allowed range [{}, {}]", value, min, max),
            ));
        }
        Ok(value)
    }

    /// Whole-number parameter within `[min, max]`.
    pub fn integer_in_range(
        &self,
        name: &str,
        min: i64,
        max: i64,
        default: Option<i64>,
    ) -> Result<i64> {
        let value = self.number_in_range(name, min as f64, max as f64, default.map(|d| d as f64))?;
        if value.fract() != 0.0 {
            return Err(Error::invalid_parameter(
                name,
                format!("{} is not a whole number", value),
            ));
        }
        Ok(value as i64)
    }

    /// Probability parameter in `[0, 1]`.
    pub fn probability(&self, name: &str, default: Option<f64>) -> Result<f64> {
        self.number_in_range(name, 0.0, 1.0, default)
    }

    /// Text parameter falling back to `default` when absent.
    pub fn text_or(&self, name: &str, default: &str) -> String {
        self.values
            .get(name)
            .map(|v| v.to_string())
            .unwrap_or_else(|| default.to_string())
    }
}

impl FromIterator<(String, ParameterValue)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, ParameterValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Configuration for one headless simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulation type identifier (e.g. "life", "wator", "darwin")
    pub simulation: String,
    /// Number of grid rows
    pub rows: i32,
    /// Number of grid columns
    pub cols: i32,
    /// Boundary handling
    pub edge: EdgeKind,
    /// Number of ticks to run
    pub num_ticks: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// How often (in ticks) population metrics are logged
    pub metrics_interval: u64,
    /// Rule parameters
    pub parameters: Parameters,
    /// Initial states, one row per grid row. Missing entries default to 0.
    pub states: Vec<Vec<u32>>,
    /// Darwin species programs keyed by species id
    pub species: BTreeMap<u32, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            simulation: "life".to_string(),
            rows: 32,
            cols: 32,
            edge: EdgeKind::Fixed,
            num_ticks: 100,
            seed: 0,
            metrics_interval: 10,
            parameters: Parameters::new(),
            states: Vec::new(),
            species: BTreeMap::new(),
        }
    }
}

impl RunConfig {
    /// Check dimensions and the initial state matrix against each other.
    pub fn validate(&self) -> Result<()> {
        if self.rows <= 0 || self.cols <= 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.states.len() > self.rows as usize {
            return Err(Error::Validation(format!(
                "{} state rows given for a grid with {} rows",
                self.states.len(),
                self.rows
            )));
        }
        if let Some((index, row)) = self
            .states
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() > self.cols as usize)
        {
            return Err(Error::Validation(format!(
                "state row {} has {} entries for a grid with {} columns",
                index,
                row.len(),
                self.cols
            )));
        }
        Ok(())
    }

    /// Initial state at a position, defaulting to 0 outside the given matrix.
    pub fn initial_state(&self, row: usize, col: usize) -> u32 {
        self.states
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_parameter() {
        let params = Parameters::new();
        let err = params.number("toleranceThreshold").unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "toleranceThreshold"));
    }

    #[test]
    fn test_range_checks() {
        let params = Parameters::new()
            .with("probability", 1.5)
            .with("layers", 2.5)
            .with("text", "abc");

        assert!(params.probability("probability", None).is_err());
        assert!(params.integer_in_range("layers", 1, 10, None).is_err());
        assert!(params.number("text").is_err());
        assert_eq!(params.probability("absent", Some(0.25)).unwrap(), 0.25);
    }

    #[test]
    fn test_numeric_text_is_accepted() {
        let params = Parameters::new().with("layers", "3");
        assert_eq!(params.integer_in_range("layers", 1, 10, None).unwrap(), 3);
        assert_eq!(params.text_or("rule", "B3/S23"), "B3/S23");
    }

    #[test]
    fn test_run_config_serialization() {
        let json = r#"{
            "simulation": "percolation",
            "rows": 2,
            "cols": 3,
            "edge": "toroidal",
            "parameters": { "rule": "B36/S23", "seed": 7 },
            "states": [[1, 0, 1], [0, 1]]
        }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.edge, EdgeKind::Toroidal);
        assert_eq!(config.num_ticks, 100);
        assert_eq!(config.parameters.text_or("rule", ""), "B36/S23");
        assert_eq!(config.initial_state(1, 2), 0);
        assert_eq!(config.initial_state(0, 2), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_run_config_rejects_oversized_states() {
        let config = RunConfig {
            rows: 1,
            cols: 1,
            states: vec![vec![0, 1]],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
