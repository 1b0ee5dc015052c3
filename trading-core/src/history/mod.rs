//! Append-only, time-ordered history of one entity's values.
//!
//! The log is a `BTreeMap` keyed by instant behind an `RwLock`. Point lookups
//! and the start of a range scan cost O(log n); a range costs O(log n + k).
//! Every append is a single insert under the write lock, so readers see
//! either the whole `(instant, value)` pair or nothing.

use log::warn;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use trading::{Observation, Result, Timestamp, ValuationError};

#[derive(Debug, Default)]
pub struct ObservationLog {
    entries: RwLock<BTreeMap<Timestamp, f64>>,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    // Writes are single inserts or a full clear, so a panic elsewhere while
    // the lock was held cannot leave the map half-updated.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<Timestamp, f64>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<Timestamp, f64>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `value` at `at`.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` if `at` is not strictly after the latest recorded
    /// instant. The log is left unchanged.
    pub fn append(&self, at: Timestamp, value: f64) -> Result<()> {
        let mut entries = self.write();
        if let Some((&last, _)) = entries.last_key_value() {
            if at <= last {
                warn!("Rejected append at {} (latest is {})", at, last);
                return Err(ValuationError::InvariantViolation { last, attempted: at });
            }
        }
        entries.insert(at, value);
        Ok(())
    }

    /// The value recorded at exactly `at`.
    pub fn exact_at(&self, at: Timestamp) -> Result<f64> {
        self.read()
            .get(&at)
            .copied()
            .ok_or(ValuationError::NotFound(at))
    }

    /// The latest observation at or before `at`.
    pub fn as_of(&self, at: Timestamp) -> Option<Observation> {
        self.read()
            .range(..=at)
            .next_back()
            .map(|(at, value)| Observation::new(*at, *value))
    }

    /// Values for every requested instant that is present. Missing instants
    /// are left out of the result.
    pub fn many_at<I>(&self, instants: I) -> BTreeMap<Timestamp, f64>
    where
        I: IntoIterator<Item = Timestamp>,
    {
        let entries = self.read();
        instants
            .into_iter()
            .filter_map(|at| entries.get(&at).map(|value| (at, *value)))
            .collect()
    }

    /// Observations with `start <= at <= end`, ascending. Empty when
    /// `start > end`.
    pub fn range_inclusive(&self, start: Timestamp, end: Timestamp) -> Vec<Observation> {
        if start > end {
            return Vec::new();
        }
        self.read()
            .range(start..=end)
            .map(|(at, value)| Observation::new(*at, *value))
            .collect()
    }

    /// The most recently appended value.
    pub fn current(&self) -> Result<f64> {
        self.latest().map(|obs| obs.value).ok_or(ValuationError::Empty)
    }

    pub fn latest(&self) -> Option<Observation> {
        self.read()
            .last_key_value()
            .map(|(at, value)| Observation::new(*at, *value))
    }

    pub fn first(&self) -> Option<Observation> {
        self.read()
            .first_key_value()
            .map(|(at, value)| Observation::new(*at, *value))
    }

    /// Up to `n` most recent observations, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Observation> {
        let entries = self.read();
        let mut tail: Vec<Observation> = entries
            .iter()
            .rev()
            .take(n)
            .map(|(at, value)| Observation::new(*at, *value))
            .collect();
        tail.reverse();
        tail
    }

    /// A consistent copy of the whole history, ascending.
    pub fn snapshot(&self) -> Vec<Observation> {
        self.read()
            .iter()
            .map(|(at, value)| Observation::new(*at, *value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}
