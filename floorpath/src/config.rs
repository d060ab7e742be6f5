use std::env;

use crate::grid::{WeightPolicy, DEFAULT_FLOOR_WEIGHT};
use crate::pipeline::Algorithm;

/// Run settings. Unset fields fall back to the defaults of the accessors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub weights: Option<WeightPolicy>,
    pub floor_weight: Option<f64>,
    pub algorithm: Option<Algorithm>,
    pub log_level: Option<String>,
}

impl Config {
    /// Read `FLOORPATH_*` variables. Values that do not parse are ignored.
    pub fn from_env_defaults() -> Self {
        let weights = env::var("FLOORPATH_WEIGHTS")
            .ok()
            .and_then(|s| s.parse().ok());
        let floor_weight = env::var("FLOORPATH_FLOOR_WEIGHT")
            .ok()
            .and_then(|s| parse_weight(&s));
        let algorithm = env::var("FLOORPATH_ALGORITHM")
            .ok()
            .and_then(|s| s.parse().ok());
        let log_level = env::var("FLOORPATH_LOG_LEVEL").ok();
        Self {
            weights,
            floor_weight,
            algorithm,
            log_level,
        }
    }

    /// Fields set in `other` win over the ones in `self`.
    pub fn overlay(self, other: Config) -> Self {
        Self {
            weights: other.weights.or(self.weights),
            floor_weight: other.floor_weight.or(self.floor_weight),
            algorithm: other.algorithm.or(self.algorithm),
            log_level: other.log_level.or(self.log_level),
        }
    }

    pub fn weights(&self) -> WeightPolicy {
        self.weights.unwrap_or_default()
    }

    pub fn floor_weight(&self) -> f64 {
        self.floor_weight.unwrap_or(DEFAULT_FLOOR_WEIGHT)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm.unwrap_or_default()
    }
}

/// Connector weights must be usable as edge weights.
pub fn parse_weight(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w > 0.0)
}
