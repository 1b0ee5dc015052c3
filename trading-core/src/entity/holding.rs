//! A quantity of one instrument, valued at market.

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use trading::{Observation, Result, Timestamp, ValuationError};

use super::{Instrument, Valued};
use crate::history::ObservationLog;

/// A long-only quantity of an `Instrument` with its own history of market
/// values (quantity × instrument price at the moment of valuation) and of
/// the quantity itself.
pub struct Holding {
    instrument: Instrument,
    quantity: Mutex<i64>,
    log: ObservationLog,
    quantities: ObservationLog,
}

impl Holding {
    /// Creates a holding and records its opening quantity.
    ///
    /// # Errors
    ///
    /// `Validation` if `quantity` is negative.
    pub fn new(instrument: Instrument, quantity: i64) -> Result<Self> {
        if quantity < 0 {
            return Err(ValuationError::Validation {
                current: 0,
                requested: quantity,
            });
        }
        let quantities = ObservationLog::new();
        quantities.append(instrument.market().now(), quantity as f64)?;
        Ok(Self {
            instrument,
            quantity: Mutex::new(quantity),
            log: ObservationLog::new(),
            quantities,
        })
    }

    // The quantity lock doubles as the writer lock of both histories.
    fn lock_quantity(&self) -> MutexGuard<'_, i64> {
        self.quantity.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn get_quantity(&self) -> i64 {
        *self.lock_quantity()
    }

    /// Replaces the quantity and records the change. Does not record a
    /// valuation.
    pub fn set_quantity(&self, quantity: i64) -> Result<()> {
        let mut current = self.lock_quantity();
        if quantity < 0 {
            warn!(
                "Rejected quantity {} for {} (holding {})",
                quantity,
                self.instrument.get_name(),
                *current
            );
            return Err(ValuationError::Validation {
                current: *current,
                requested: quantity,
            });
        }
        self.quantities
            .append(self.instrument.market().now(), quantity as f64)?;
        *current = quantity;
        Ok(())
    }

    /// Adds `delta` to the quantity, then records and returns a valuation at
    /// the new quantity. The new quantity is recorded at the same instant.
    ///
    /// # Errors
    ///
    /// `Validation` if the result would be negative. On any error the
    /// quantity is left untouched.
    pub fn adjust_quantity(&self, delta: i64) -> Result<Observation> {
        let mut current = self.lock_quantity();
        let updated = match current.checked_add(delta) {
            Some(updated) if updated >= 0 => updated,
            _ => {
                warn!(
                    "Rejected adjustment {} for {} (holding {})",
                    delta,
                    self.instrument.get_name(),
                    *current
                );
                return Err(ValuationError::Validation {
                    current: *current,
                    requested: current.saturating_add(delta),
                });
            }
        };
        let obs = self.record(updated)?;
        self.quantities.append(obs.at, updated as f64)?;
        *current = updated;
        Ok(obs)
    }

    /// The quantity in effect at `at`: the latest one recorded at or before
    /// it.
    ///
    /// # Errors
    ///
    /// `NotFound` if `at` is before the holding was created.
    pub fn get_quantity_at(&self, at: Timestamp) -> Result<i64> {
        self.quantities
            .as_of(at)
            .map(|obs| obs.value as i64)
            .ok_or(ValuationError::NotFound(at))
    }

    /// Quantities in effect at each requested instant. Instants before the
    /// holding was created are left out.
    pub fn get_quantities_at<I>(&self, instants: I) -> BTreeMap<Timestamp, i64>
    where
        I: IntoIterator<Item = Timestamp>,
    {
        instants
            .into_iter()
            .filter_map(|at| self.get_quantity_at(at).ok().map(|quantity| (at, quantity)))
            .collect()
    }

    /// Quantity changes recorded with `start <= at <= end`, ascending.
    pub fn get_quantities_in_range(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Vec<(Timestamp, i64)> {
        self.quantities
            .range_inclusive(start, end)
            .into_iter()
            .map(|obs| (obs.at, obs.value as i64))
            .collect()
    }

    /// Prices the instrument afresh and appends `quantity × price`. Callers
    /// hold the quantity lock.
    fn record(&self, quantity: i64) -> Result<Observation> {
        let price = self.instrument.current_observation()?.value;
        let value = quantity as f64 * price;
        let at = self.instrument.market().now();
        self.log.append(at, value)?;
        debug!(
            "{} x {} @ {:.4} = {:.4}",
            quantity,
            self.instrument.get_name(),
            price,
            value
        );
        Ok(Observation::new(at, value))
    }
}

impl Valued for Holding {
    fn name(&self) -> &str {
        self.instrument.get_name()
    }

    fn history(&self) -> &ObservationLog {
        &self.log
    }

    fn current_observation(&self) -> Result<Observation> {
        let quantity = self.lock_quantity();
        self.record(*quantity)
    }
}

impl fmt::Debug for Holding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Holding")
            .field("instrument", &self.instrument.get_name())
            .field("quantity", &self.get_quantity())
            .field("observations", &self.log.len())
            .field("quantity_changes", &self.quantities.len())
            .finish()
    }
}
