//! Market Data models.
//!
//! `PriceUpdate` is the flattened, serializable form of a generated price,
//! handed to consumers that sit outside the valuation core (feeds, charts).

use crate::model::observation::{Observation, Timestamp};
use serde::{Deserialize, Serialize};

/// A single generated price for a named instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// The instrument name.
    pub instrument: String,
    /// The generated price.
    pub last: f64,
    /// When the price was recorded.
    pub timestamp: Timestamp,
}

impl PriceUpdate {
    /// Creates a new PriceUpdate.
    pub fn new(instrument: impl Into<String>, last: f64, timestamp: Timestamp) -> Self {
        Self {
            instrument: instrument.into(),
            last,
            timestamp,
        }
    }

    /// Wraps a recorded observation of `instrument`.
    pub fn from_observation(instrument: impl Into<String>, observation: Observation) -> Self {
        Self::new(instrument, observation.value, observation.at)
    }
}
