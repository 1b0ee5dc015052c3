use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON file with simulation settings and accounts. Built-in accounts
    /// are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of valuation rounds to run
    #[arg(long, default_value_t = 20)]
    pub ticks: u64,

    /// Delay between rounds in milliseconds
    #[arg(long, default_value_t = 250)]
    pub interval_ms: u64,

    /// Apply a synthetic trade to every holding each N rounds (0 disables)
    #[arg(long, default_value_t = 5)]
    pub trade_every: u64,

    /// RNG seed, overrides the one in the config file
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print each holding's recorded history as JSON when done
    #[arg(long)]
    pub dump_history: bool,
}
