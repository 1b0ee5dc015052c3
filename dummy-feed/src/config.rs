use anyhow::{Context, Result};
use portfolio_manager::{Account, Portfolio};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use trading_core::{MarketSimulator, SimulationConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingConfig {
    pub instrument: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub name: String,
    pub holdings: Vec<HoldingConfig>,
}

fn default_portfolio_name() -> String {
    "Simulated".to_string()
}

fn default_accounts() -> Vec<AccountConfig> {
    let holding = |instrument: &str, quantity| HoldingConfig {
        instrument: instrument.to_string(),
        quantity,
    };
    vec![
        AccountConfig {
            name: "Account A".to_string(),
            holdings: vec![
                holding("IBM US Equity", 530),
                holding("TSLA US Equity", 1120),
                holding("NVDA US Equity", 7421),
            ],
        },
        AccountConfig {
            name: "Account B".to_string(),
            holdings: vec![
                holding("IBM US Equity", 201),
                holding("MSFT US Equity", 400),
                holding("NVDA US Equity", 300),
                holding("DLTA US Equity", 623),
            ],
        },
    ]
}

/// Everything the feed needs to build a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_portfolio_name")]
    pub portfolio: String,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default = "default_accounts")]
    pub accounts: Vec<AccountConfig>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            portfolio: default_portfolio_name(),
            simulation: SimulationConfig::default(),
            accounts: default_accounts(),
        }
    }
}

impl FeedConfig {
    /// Loads a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader).context("Failed to parse config file")
    }

    /// Builds the portfolio described by this config on `market`.
    pub fn build_portfolio(&self, market: &Arc<MarketSimulator>) -> Result<Portfolio> {
        let accounts = self
            .accounts
            .iter()
            .map(|account| -> Result<Account> {
                let holdings = account
                    .holdings
                    .iter()
                    .map(|h| {
                        market.create_holding(&h.instrument, h.quantity).with_context(|| {
                            format!("Invalid holding {} in {}", h.instrument, account.name)
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Account::new(account.name.clone(), holdings))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Portfolio::new(self.portfolio.clone(), accounts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"simulation": {{"seed": 3, "rally_length": 4}}}}"#).unwrap();

        let config = FeedConfig::load(file.path()).unwrap();
        assert_eq!(config.simulation.seed, Some(3));
        assert_eq!(config.simulation.rally_length, 4);
        assert_eq!(config.accounts, default_accounts());
        assert_eq!(config.portfolio, "Simulated");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(FeedConfig::load(Path::new("/nonexistent/feed.json")).is_err());
    }

    #[test]
    fn test_build_portfolio_rejects_short_holding() {
        let mut config = FeedConfig::default();
        config.accounts[0].holdings[0].quantity = -5;
        let market = Arc::new(MarketSimulator::default());
        let err = config.build_portfolio(&market).unwrap_err();
        assert!(err.to_string().contains("IBM US Equity"));
    }

    #[test]
    fn test_build_default_portfolio() {
        let market = Arc::new(MarketSimulator::default());
        let portfolio = FeedConfig::default().build_portfolio(&market).unwrap();
        assert_eq!(portfolio.get_all_accounts().len(), 2);
        assert_eq!(
            portfolio
                .get_account("Account B")
                .unwrap()
                .get_all_holdings()
                .len(),
            4
        );
    }
}
