//! A named tradable instrument priced by the market simulator.

use std::fmt;
use std::sync::Arc;
use trading::{AssetClass, Observation, Result};

use super::Valued;
use crate::history::ObservationLog;
use crate::market::{MarketSimulator, Track};

/// Handle to one instrument of a `MarketSimulator`.
///
/// Handles are cheap to clone. All handles with the same name on the same
/// simulator share one price history.
#[derive(Clone)]
pub struct Instrument {
    market: Arc<MarketSimulator>,
    track: Arc<Track>,
}

impl Instrument {
    pub fn new(market: &Arc<MarketSimulator>, name: &str) -> Self {
        Self {
            market: Arc::clone(market),
            track: market.track(name),
        }
    }

    pub fn get_name(&self) -> &str {
        self.track.name()
    }

    pub fn asset_class(&self) -> AssetClass {
        self.track.asset_class()
    }

    pub fn market(&self) -> &Arc<MarketSimulator> {
        &self.market
    }
}

impl Valued for Instrument {
    fn name(&self) -> &str {
        self.track.name()
    }

    fn history(&self) -> &ObservationLog {
        self.track.log()
    }

    fn current_observation(&self) -> Result<Observation> {
        self.market.advance(&self.track)
    }
}

impl fmt::Debug for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrument")
            .field("name", &self.track.name())
            .field("class", &self.track.asset_class())
            .finish()
    }
}

impl PartialEq for Instrument {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.track, &other.track)
    }
}

impl Eq for Instrument {}
