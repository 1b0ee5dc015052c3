pub mod instrument;
pub mod market_data;
pub mod observation;

pub use instrument::AssetClass;
pub use market_data::PriceUpdate;
pub use observation::{Observation, Timestamp};
