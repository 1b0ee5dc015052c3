use log::debug;
use std::collections::{BTreeMap, HashSet};
use trading::Result;
use trading_core::{Instrument, Valued};

use super::account::Account;
use super::ids::HoldingKey;

/// A named set of accounts, keyed by account name.
#[derive(Debug)]
pub struct Portfolio {
    name: String,
    accounts: BTreeMap<String, Account>,
}

impl Portfolio {
    pub fn new(name: impl Into<String>, accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            name: name.into(),
            accounts: accounts
                .into_iter()
                .map(|account| (account.get_name().to_string(), account))
                .collect(),
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_all_accounts(&self) -> Vec<&Account> {
        self.accounts.values().collect()
    }

    pub fn get_account(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    /// Accounts selected by name, then narrowed to those holding any of
    /// `keys`. An empty filter does not restrict.
    pub fn get_accounts<N, K>(
        &self,
        account_names: impl IntoIterator<Item = N>,
        keys: impl IntoIterator<Item = K>,
    ) -> Vec<&Account>
    where
        N: AsRef<str>,
        K: Into<HoldingKey>,
    {
        let names: HashSet<String> = account_names
            .into_iter()
            .map(|n| n.as_ref().to_string())
            .collect();
        let keys: Vec<HoldingKey> = keys.into_iter().map(Into::into).collect();

        self.accounts
            .values()
            .filter(|account| names.is_empty() || names.contains(account.get_name()))
            .filter(|account| {
                keys.is_empty() || keys.iter().any(|key| account.contains(key.clone()))
            })
            .collect()
    }

    /// Adds accounts, replacing any account with the same name.
    pub fn add_accounts(&mut self, accounts: impl IntoIterator<Item = Account>) {
        for account in accounts {
            debug!("{}: added account {}", self.name, account.get_name());
            self.accounts.insert(account.get_name().to_string(), account);
        }
    }

    /// Removes accounts by name. Unknown names are ignored.
    pub fn remove_accounts<N: AsRef<str>>(&mut self, account_names: impl IntoIterator<Item = N>) {
        for name in account_names {
            if self.accounts.remove(name.as_ref()).is_some() {
                debug!("{}: removed account {}", self.name, name.as_ref());
            }
        }
    }

    /// Market value of every account. Quantities are netted per instrument
    /// across accounts and each instrument is priced once.
    pub fn get_current_market_value(&self) -> Result<f64> {
        Self::aggregate_market_value(self.accounts.values())
    }

    /// Market value of the accounts selected by `get_accounts`.
    pub fn get_current_filtered_market_value<N, K>(
        &self,
        keys: impl IntoIterator<Item = K>,
        account_names: impl IntoIterator<Item = N>,
    ) -> Result<f64>
    where
        N: AsRef<str>,
        K: Into<HoldingKey>,
    {
        Self::aggregate_market_value(self.get_accounts(account_names, keys))
    }

    fn aggregate_market_value<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Result<f64> {
        let mut net: BTreeMap<HoldingKey, (i64, &Instrument)> = BTreeMap::new();
        for account in accounts {
            for holding in account.get_all_holdings() {
                let entry = net
                    .entry(HoldingKey::from(holding))
                    .or_insert((0, holding.instrument()));
                entry.0 = entry.0.saturating_add(holding.get_quantity());
            }
        }

        net.values()
            .map(|(quantity, instrument)| {
                instrument
                    .get_current_value()
                    .map(|price| *quantity as f64 * price)
            })
            .sum()
    }
}
