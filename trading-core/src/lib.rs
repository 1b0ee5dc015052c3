//! # Trading Core Library
//!
//! Price simulation and valuation history for simulated instruments and
//! holdings.
//!
//! ## Modules
//! - `market`: The stochastic price process, its configuration and clock.
//! - `history`: Append-only, time-indexed observation log.
//! - `entity`: `Instrument` and `Holding`, which record every value they produce.

pub mod entity;
pub mod history;
pub mod market;

pub use entity::{Holding, Instrument, Valued};
pub use history::ObservationLog;
pub use market::{MarketSimulator, SimulationConfig, TransactionGenerator};
