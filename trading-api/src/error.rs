//! Error type shared by every valuation component.

use crate::model::observation::Timestamp;
use thiserror::Error;

/// Failures surfaced by price generation, history queries and holding updates.
///
/// None of these are transient: the caller has to correct its input and
/// re-issue the call. A failed call never leaves partial state behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// A quantity update would leave a holding short.
    #[error("Quantity update would cause a short position (current {current}, requested {requested})")]
    Validation { current: i64, requested: i64 },

    /// No observation carries this exact instant.
    #[error("No observation recorded at {0}")]
    NotFound(Timestamp),

    /// The history has no observations yet.
    #[error("No observations recorded yet")]
    Empty,

    /// An append did not move time forward. Unreachable while each entity
    /// has a single writer and instants come from a monotonic clock.
    #[error("Non-increasing append: last instant {last}, attempted {attempted}")]
    InvariantViolation { last: Timestamp, attempted: Timestamp },

    /// Simulation settings that cannot drive the price process.
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),
}

/// A specialized Result type for valuation operations.
pub type Result<T> = std::result::Result<T, ValuationError>;
