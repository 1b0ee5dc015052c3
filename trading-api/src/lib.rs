//! Shared vocabulary of the valuation engine: instants, observations,
//! instrument classification and the error type every component reports.

pub mod error;
pub mod model;

pub use error::{Result, ValuationError};
pub use model::instrument::AssetClass;
pub use model::market_data::PriceUpdate;
pub use model::observation::{Observation, Timestamp};
