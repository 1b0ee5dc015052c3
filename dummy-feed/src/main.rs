//! A simulated valuation feed.
//!
//! Builds a portfolio on a fresh `MarketSimulator`, then values every holding
//! on a fixed interval. Each generated price goes to stdout as one JSON line;
//! portfolio totals and synthetic trades are logged.

mod args;
mod config;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use portfolio_manager::{HoldingKey, Portfolio};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use trading::{Observation, PriceUpdate};
use trading_core::{MarketSimulator, TransactionGenerator, Valued};

use args::Args;
use config::FeedConfig;

/// Values a portfolio round after round and replays synthetic trades.
struct SimulatedFeed {
    market: Arc<MarketSimulator>,
    portfolio: Portfolio,
    trades: BTreeMap<(String, HoldingKey), TransactionGenerator>,
}

#[derive(Serialize)]
struct HoldingHistory<'a> {
    account: &'a str,
    instrument: &'a str,
    quantity: i64,
    observations: Vec<Observation>,
}

impl SimulatedFeed {
    fn new(
        market: Arc<MarketSimulator>,
        portfolio: Portfolio,
        trade_rounds: usize,
    ) -> Result<Self> {
        let mut trades = BTreeMap::new();
        if trade_rounds > 0 {
            for account in portfolio.get_all_accounts() {
                for holding in account.get_all_holdings() {
                    trades.insert(
                        (account.get_name().to_string(), HoldingKey::from(holding)),
                        TransactionGenerator::new(trade_rounds)?,
                    );
                }
            }
        }
        Ok(Self {
            market,
            portfolio,
            trades,
        })
    }

    /// Values every holding once, applying the next synthetic trade when
    /// `trade` is set. Returns the instrument prices generated on the way.
    fn next_round(&mut self, trade: bool) -> Result<Vec<PriceUpdate>> {
        let mut updates = Vec::new();
        for account in self.portfolio.get_all_accounts() {
            for holding in account.get_all_holdings() {
                let key = (account.get_name().to_string(), HoldingKey::from(holding));
                let delta = if trade {
                    self.trades.get_mut(&key).and_then(|generator| generator.next())
                } else {
                    None
                };

                match delta {
                    Some(delta) => {
                        holding.adjust_quantity(delta)?;
                        info!(
                            "{}: traded {:+} {} -> {}",
                            account.get_name(),
                            delta,
                            key.1,
                            holding.get_quantity()
                        );
                    }
                    None => {
                        holding.current_observation()?;
                    }
                }

                let price = holding.instrument().peek()?;
                updates.push(PriceUpdate::from_observation(key.1.as_str(), price));
            }
        }
        Ok(updates)
    }

    fn histories(&self) -> Vec<HoldingHistory<'_>> {
        let mut out = Vec::new();
        for account in self.portfolio.get_all_accounts() {
            for holding in account.get_all_holdings() {
                let observations = match (holding.history().first(), holding.history().latest()) {
                    (Some(first), Some(last)) => holding.get_values_in_range(first.at, last.at),
                    _ => Vec::new(),
                };
                out.push(HoldingHistory {
                    account: account.get_name(),
                    instrument: holding.instrument().get_name(),
                    quantity: holding.get_quantity(),
                    observations,
                });
            }
        }
        out
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FeedConfig::load(path)?,
        None => FeedConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }

    let market = Arc::new(MarketSimulator::new(config.simulation.clone())?);
    let portfolio = config.build_portfolio(&market)?;
    info!(
        "=== Feed Starting: portfolio '{}' with {} accounts, {} rounds ===",
        portfolio.get_name(),
        portfolio.get_all_accounts().len(),
        args.ticks
    );

    let trade_rounds = if args.trade_every == 0 {
        0
    } else {
        (args.ticks / args.trade_every) as usize
    };
    let mut feed = SimulatedFeed::new(market, portfolio, trade_rounds)?;

    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms));
    for tick in 1..=args.ticks {
        interval.tick().await;

        let trade = args.trade_every > 0 && tick % args.trade_every == 0;
        for update in feed.next_round(trade)? {
            println!("{}", serde_json::to_string(&update)?);
        }

        match feed.portfolio.get_current_market_value() {
            Ok(total) => info!("Round {}: portfolio value {:.2}", tick, total),
            Err(e) => warn!("Round {}: failed to value portfolio: {}", tick, e),
        }
    }

    info!(
        "Feed finished. Instruments simulated: {}",
        feed.market.instruments().join(", ")
    );
    if args.dump_history {
        println!("{}", serde_json::to_string_pretty(&feed.histories())?);
    }

    Ok(())
}
