//! Settings of the stochastic price process.

use serde::{Deserialize, Serialize};
use trading::model::instrument::DEFAULT_EQUITY_MARKERS;
use trading::{Result, ValuationError};

/// Half-open integer range `[low, high)` used for seed and general draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawRange {
    pub low: i64,
    pub high: i64,
}

impl DrawRange {
    pub const fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }
}

/// Half-open fractional range `[low, high)` of a relative price step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRange {
    pub low: f64,
    pub high: f64,
}

impl StepRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

fn default_equity_markers() -> Vec<String> {
    DEFAULT_EQUITY_MARKERS.iter().map(|m| m.to_string()).collect()
}

fn default_equity_seed() -> DrawRange {
    DrawRange::new(0, 10_000)
}

fn default_general_range() -> DrawRange {
    DrawRange::new(-2_000, 10_000)
}

fn default_rally_probability() -> f64 {
    0.0005
}

fn default_rally_length() -> u32 {
    10
}

fn default_small_step() -> StepRange {
    StepRange::new(0.0001, 0.01)
}

fn default_rally_step() -> StepRange {
    StepRange::new(0.05, 0.1)
}

/// Configuration of a `MarketSimulator`.
///
/// Every field falls back to its default when missing from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Case-insensitive name fragments that make an instrument equity-like.
    #[serde(default = "default_equity_markers")]
    pub equity_markers: Vec<String>,
    /// First price of an equity-like instrument.
    #[serde(default = "default_equity_seed")]
    pub equity_seed: DrawRange,
    /// Every price of a general instrument.
    #[serde(default = "default_general_range")]
    pub general_range: DrawRange,
    /// Chance per sample that a rising equity starts a rally.
    #[serde(default = "default_rally_probability")]
    pub rally_probability: f64,
    /// Number of samples a rally lasts.
    #[serde(default = "default_rally_length")]
    pub rally_length: u32,
    #[serde(default = "default_small_step")]
    pub small_step: StepRange,
    #[serde(default = "default_rally_step")]
    pub rally_step: StepRange,
    /// Fixed RNG seed for reproducible runs. Entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            equity_markers: default_equity_markers(),
            equity_seed: default_equity_seed(),
            general_range: default_general_range(),
            rally_probability: default_rally_probability(),
            rally_length: default_rally_length(),
            small_step: default_small_step(),
            rally_step: default_rally_step(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_rally_probability(mut self, probability: f64) -> Self {
        self.rally_probability = probability;
        self
    }

    /// Checks that every range can be sampled and that equity prices cannot
    /// reach zero.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ValuationError::InvalidConfig(msg));

        // Zero is skipped when seeding equities, so the range must reach 1.
        if self.equity_seed.high <= self.equity_seed.low.max(1) {
            return invalid(format!(
                "equity seed range [{}, {}) holds no positive value",
                self.equity_seed.low, self.equity_seed.high
            ));
        }
        if self.general_range.high <= self.general_range.low {
            return invalid(format!(
                "general range [{}, {}) is empty",
                self.general_range.low, self.general_range.high
            ));
        }
        if !(0.0..=1.0).contains(&self.rally_probability) {
            return invalid(format!(
                "rally probability {} is outside [0, 1]",
                self.rally_probability
            ));
        }
        if self.rally_length == 0 {
            return invalid("rally length must be at least 1".to_string());
        }
        for (label, step) in [("small", self.small_step), ("rally", self.rally_step)] {
            // A relative step of 1 or more could take an equity to zero or below.
            if !(step.low >= 0.0 && step.low < step.high && step.high < 1.0) {
                return invalid(format!(
                    "{} step range [{}, {}) must satisfy 0 <= low < high < 1",
                    label, step.low, step.high
                ));
            }
        }
        Ok(())
    }
}
