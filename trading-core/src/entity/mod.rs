//! Trackable entities: things with a current value and a replayable history.
//!
//! Asking an entity for its current value is not idempotent: it produces a
//! fresh value, appends it to the entity's own history and returns it. The
//! history queries only replay what earlier calls recorded.

pub mod holding;
pub mod instrument;

pub use holding::Holding;
pub use instrument::Instrument;

use std::collections::BTreeMap;
use trading::{Observation, Result, Timestamp, ValuationError};

use crate::history::ObservationLog;

pub trait Valued {
    fn name(&self) -> &str;

    /// The entity's own history.
    fn history(&self) -> &ObservationLog;

    /// Produces and records a new value, returning it with its instant.
    fn current_observation(&self) -> Result<Observation>;

    /// Produces and records a new value.
    fn get_current_value(&self) -> Result<f64> {
        self.current_observation().map(|obs| obs.value)
    }

    /// The last recorded observation. Does not advance anything.
    fn peek(&self) -> Result<Observation> {
        self.history().latest().ok_or(ValuationError::Empty)
    }

    fn get_value_at(&self, at: Timestamp) -> Result<f64> {
        self.history().exact_at(at)
    }

    fn get_values_at<I>(&self, instants: I) -> BTreeMap<Timestamp, f64>
    where
        I: IntoIterator<Item = Timestamp>,
        Self: Sized,
    {
        self.history().many_at(instants)
    }

    fn get_values_in_range(&self, start: Timestamp, end: Timestamp) -> Vec<Observation> {
        self.history().range_inclusive(start, end)
    }
}
