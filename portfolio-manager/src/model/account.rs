use log::debug;
use std::collections::BTreeMap;
use trading::Result;
use trading_core::{Holding, Valued};

use super::ids::HoldingKey;

/// A named set of holdings, at most one per instrument.
#[derive(Debug)]
pub struct Account {
    name: String,
    holdings: BTreeMap<HoldingKey, Holding>,
}

impl Account {
    /// Creates an account. When two holdings share an instrument the later
    /// one wins.
    pub fn new(name: impl Into<String>, holdings: impl IntoIterator<Item = Holding>) -> Self {
        Self {
            name: name.into(),
            holdings: holdings
                .into_iter()
                .map(|holding| (HoldingKey::from(&holding), holding))
                .collect(),
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_all_holdings(&self) -> Vec<&Holding> {
        self.holdings.values().collect()
    }

    pub fn get_holding(&self, key: impl Into<HoldingKey>) -> Option<&Holding> {
        self.holdings.get(&key.into())
    }

    pub fn contains(&self, key: impl Into<HoldingKey>) -> bool {
        self.holdings.contains_key(&key.into())
    }

    /// Holdings matching any of `keys`. Keys without a holding are skipped.
    pub fn get_holdings<K>(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> BTreeMap<HoldingKey, &Holding>
    where
        K: Into<HoldingKey>,
    {
        keys.into_iter()
            .map(Into::into)
            .filter_map(|key| self.holdings.get(&key).map(|holding| (key, holding)))
            .collect()
    }

    /// Adds holdings. A holding on an instrument already present updates the
    /// existing holding's quantity and keeps its history; others are inserted.
    pub fn add_holdings(&mut self, holdings: impl IntoIterator<Item = Holding>) -> Result<()> {
        for holding in holdings {
            let key = HoldingKey::from(&holding);
            match self.holdings.get(&key) {
                Some(existing) => {
                    existing.set_quantity(holding.get_quantity())?;
                    debug!("{}: {} set to {}", self.name, key, holding.get_quantity());
                }
                None => {
                    debug!("{}: added {}", self.name, key);
                    self.holdings.insert(key, holding);
                }
            }
        }
        Ok(())
    }

    /// Removes holdings by key. Unknown keys are ignored.
    pub fn remove_holdings<K>(&mut self, keys: impl IntoIterator<Item = K>)
    where
        K: Into<HoldingKey>,
    {
        for key in keys {
            let key = key.into();
            if self.holdings.remove(&key).is_some() {
                debug!("{}: removed {}", self.name, key);
            }
        }
    }

    /// Sum of a fresh valuation of every holding. Each holding records its
    /// own value; the total is not recorded.
    pub fn get_current_market_value(&self) -> Result<f64> {
        self.holdings
            .values()
            .map(|holding| holding.get_current_value())
            .sum()
    }

    /// Like `get_current_market_value`, restricted to holdings in `keys`.
    pub fn get_current_filtered_market_value<K>(
        &self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<f64>
    where
        K: Into<HoldingKey>,
    {
        self.get_holdings(keys)
            .values()
            .map(|holding| holding.get_current_value())
            .sum()
    }
}
