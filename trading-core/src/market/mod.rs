//! Stochastic price process.
//!
//! A `MarketSimulator` owns the price history and rally state of every
//! instrument it has been asked about, plus the RNG and clock that drive
//! them. It is created once per simulation run and shared by reference with
//! the `Instrument` handles built from it.
//!
//! Equity-like instruments follow a multiplicative random walk: small
//! relative steps, occasionally a rally of larger steps after a rise.
//! Everything else is an independent uniform draw on each sample.

pub mod clock;
pub mod config;
pub mod transactions;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use trading::{AssetClass, Observation, Result, Timestamp};

use crate::entity::{Holding, Instrument};
use crate::history::ObservationLog;
pub use clock::MonotonicClock;
pub use config::SimulationConfig;
pub use transactions::TransactionGenerator;

/// Mutable per-instrument state guarded for the whole of one sample.
#[derive(Debug, Default)]
struct TrackState {
    /// Samples left in the active rally.
    rally_remaining: Option<u32>,
}

/// Price history of one instrument.
#[derive(Debug)]
pub struct Track {
    name: String,
    class: AssetClass,
    state: Mutex<TrackState>,
    log: ObservationLog,
}

impl Track {
    fn new(name: &str, class: AssetClass) -> Self {
        Self {
            name: name.to_string(),
            class,
            state: Mutex::new(TrackState::default()),
            log: ObservationLog::new(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, TrackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asset_class(&self) -> AssetClass {
        self.class
    }

    pub fn log(&self) -> &ObservationLog {
        &self.log
    }

    pub fn is_rally_active(&self) -> bool {
        self.lock_state().rally_remaining.is_some()
    }

    fn reset(&self) {
        let mut state = self.lock_state();
        state.rally_remaining = None;
        self.log.clear();
    }
}

pub struct MarketSimulator {
    config: SimulationConfig,
    rng: Mutex<StdRng>,
    clock: MonotonicClock,
    tracks: RwLock<HashMap<String, Arc<Track>>>,
}

impl Default for MarketSimulator {
    fn default() -> Self {
        Self::build(SimulationConfig::default())
    }
}

impl std::fmt::Debug for MarketSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketSimulator")
            .field("config", &self.config)
            .field("instruments", &self.instruments())
            .finish()
    }
}

impl MarketSimulator {
    /// Creates a simulator after validating `config`.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
            clock: MonotonicClock::new(),
            tracks: RwLock::new(HashMap::new()),
        }
    }

    /// The shared clock. Every instant recorded by this simulation comes
    /// from here.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn classify(&self, name: &str) -> AssetClass {
        AssetClass::classify(name, &self.config.equity_markers)
    }

    /// Returns the track for `name`, creating an empty one on first use.
    pub fn track(&self, name: &str) -> Arc<Track> {
        if let Some(track) = self
            .tracks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Arc::clone(track);
        }
        let mut tracks = self.tracks.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            tracks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Track::new(name, self.classify(name)))),
        )
    }

    fn existing_track(&self, name: &str) -> Option<Arc<Track>> {
        self.tracks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Builds an `Instrument` handle bound to this simulator.
    pub fn create_instrument(self: &Arc<Self>, name: &str) -> Instrument {
        Instrument::new(self, name)
    }

    /// Builds a `Holding` of `quantity` units of the instrument called `name`.
    pub fn create_holding(self: &Arc<Self>, name: &str, quantity: i64) -> Result<Holding> {
        Holding::new(self.create_instrument(name), quantity)
    }

    /// Generates, records and returns the next price of `name`.
    pub fn next_sample(&self, name: &str) -> Result<f64> {
        let track = self.track(name);
        Ok(self.advance(&track)?.value)
    }

    /// Generates the next price of `track` and appends it at the current
    /// instant. The track state stays locked from reading the last price to
    /// the append, so concurrent callers never step from the same price.
    pub(crate) fn advance(&self, track: &Track) -> Result<Observation> {
        let mut state = track.lock_state();
        let recent = track.log.recent(2);

        let value = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            match (track.class, recent.last()) {
                (AssetClass::Equity, None) => {
                    let seed = &self.config.equity_seed;
                    rng.gen_range(seed.low.max(1)..seed.high) as f64
                }
                (AssetClass::Equity, Some(last)) => {
                    self.step_equity(&mut *rng, &mut *state, track, &recent, last.value)
                }
                (AssetClass::General, _) => {
                    let range = &self.config.general_range;
                    rng.gen_range(range.low..range.high) as f64
                }
            }
        };

        let at = self.clock.now();
        track.log.append(at, value)?;
        debug!("{} -> {:.4} at {}", track.name, value, at);
        Ok(Observation::new(at, value))
    }

    fn step_equity<R: Rng>(
        &self,
        rng: &mut R,
        state: &mut TrackState,
        track: &Track,
        recent: &[Observation],
        last: f64,
    ) -> f64 {
        let rising = matches!(recent, [prev, latest] if latest.value > prev.value);
        if rising
            && state.rally_remaining.is_none()
            && rng.gen_bool(self.config.rally_probability)
        {
            info!(
                "Rally started on {} for {} samples",
                track.name, self.config.rally_length
            );
            state.rally_remaining = Some(self.config.rally_length);
        }

        let step = match state.rally_remaining {
            Some(remaining) => {
                let range = &self.config.rally_step;
                state.rally_remaining = remaining.checked_sub(1).filter(|left| *left > 0);
                if state.rally_remaining.is_none() {
                    info!("Rally ended on {}", track.name);
                }
                last * rng.gen_range(range.low..range.high)
            }
            None => {
                let range = &self.config.small_step;
                last * rng.gen_range(range.low..range.high)
            }
        };

        if rng.gen_bool(0.5) {
            last + step
        } else {
            last - step
        }
    }

    /// Recorded prices of `name`, oldest first. Empty for unknown names.
    pub fn history(&self, name: &str) -> Vec<f64> {
        self.existing_track(name)
            .map(|track| track.log.snapshot().iter().map(|o| o.value).collect())
            .unwrap_or_default()
    }

    pub fn last_price(&self, name: &str) -> Option<f64> {
        self.existing_track(name)
            .and_then(|track| track.log.latest())
            .map(|obs| obs.value)
    }

    pub fn is_rally_active(&self, name: &str) -> bool {
        self.existing_track(name)
            .map(|track| track.is_rally_active())
            .unwrap_or(false)
    }

    /// Names with a track, sorted.
    pub fn instruments(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tracks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Forgets the history and rally of `name`.
    ///
    /// The track itself is kept, so instruments already bound to it observe
    /// the empty history.
    pub fn reset(&self, name: &str) {
        if let Some(track) = self.existing_track(name) {
            track.reset();
            info!("Reset price history of {}", name);
        }
    }

    /// Forgets the history and rally of every instrument.
    pub fn reset_all(&self) {
        let tracks = self.tracks.read().unwrap_or_else(PoisonError::into_inner);
        for track in tracks.values() {
            track.reset();
        }
        info!("Reset price history of {} instruments", tracks.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::config::{DrawRange, StepRange};

    fn seeded(seed: u64) -> MarketSimulator {
        MarketSimulator::new(SimulationConfig::default().with_seed(seed)).unwrap()
    }

    #[test]
    fn test_equity_seed_in_range() {
        let market = seeded(1);
        for i in 0..200 {
            let name = format!("SYM{} US Equity", i);
            let price = market.next_sample(&name).unwrap();
            assert!((1.0..10_000.0).contains(&price), "seed {} out of range", price);
            assert_eq!(price.fract(), 0.0);
        }
    }

    #[test]
    fn test_general_draws_stay_in_range() {
        let market = seeded(2);
        let mut saw_negative = false;
        for _ in 0..2_000 {
            let price = market.next_sample("CL1 Comdty").unwrap();
            assert!((-2_000.0..10_000.0).contains(&price));
            saw_negative |= price < 0.0;
        }
        assert!(saw_negative);
        assert_eq!(market.history("CL1 Comdty").len(), 2_000);
    }

    #[test]
    fn test_equity_small_steps_are_bounded() {
        let market = seeded(3);
        let name = "IBM US Equity";
        for _ in 0..500 {
            market.next_sample(name).unwrap();
        }
        let history = market.history(name);
        for pair in history.windows(2) {
            let rel = (pair[1] - pair[0]).abs() / pair[0];
            assert!(rel < 0.1 + 1e-12, "step {} too large", rel);
        }
    }

    #[test]
    fn test_equity_stays_positive_through_rallies() {
        let config = SimulationConfig::default()
            .with_seed(4)
            .with_rally_probability(1.0);
        let market = MarketSimulator::new(config).unwrap();
        let name = "TSLA US Equity";
        let mut rallied = false;
        for _ in 0..5_000 {
            let price = market.next_sample(name).unwrap();
            assert!(price > 0.0);
            rallied |= market.is_rally_active(name);
        }
        assert!(rallied);
    }

    #[test]
    fn test_rally_lasts_configured_length() {
        let mut config = SimulationConfig::default()
            .with_seed(5)
            .with_rally_probability(1.0);
        config.rally_length = 3;
        config.small_step = StepRange::new(0.0001, 0.0002);
        let market = MarketSimulator::new(config).unwrap();
        let name = "NVDA US Equity";

        // Sample until a rally starts, then count how long it stays active.
        let mut guard = 0;
        while !market.is_rally_active(name) {
            market.next_sample(name).unwrap();
            guard += 1;
            assert!(guard < 10_000, "rally never started");
        }
        let mut active = 1;
        while market.is_rally_active(name) {
            market.next_sample(name).unwrap();
            active += 1;
        }
        assert_eq!(active, 3);
    }

    #[test]
    fn test_no_rally_without_probability() {
        let market = MarketSimulator::new(
            SimulationConfig::default()
                .with_seed(6)
                .with_rally_probability(0.0),
        )
        .unwrap();
        for _ in 0..1_000 {
            market.next_sample("MSFT US Equity").unwrap();
            assert!(!market.is_rally_active("MSFT US Equity"));
        }
    }

    #[test]
    fn test_same_seed_same_prices() {
        let a = seeded(42);
        let b = seeded(42);
        for _ in 0..50 {
            assert_eq!(
                a.next_sample("DLTA US Equity").unwrap(),
                b.next_sample("DLTA US Equity").unwrap()
            );
        }
    }

    #[test]
    fn test_reset_single_instrument() {
        let market = seeded(7);
        market.next_sample("IBM US Equity").unwrap();
        market.next_sample("MSFT US Equity").unwrap();
        market.reset("IBM US Equity");
        assert!(market.history("IBM US Equity").is_empty());
        assert_eq!(market.history("MSFT US Equity").len(), 1);
        assert_eq!(market.last_price("IBM US Equity"), None);
    }

    #[test]
    fn test_reset_all_then_seed() {
        let market = seeded(8);
        for _ in 0..5 {
            market.next_sample("X US Equity").unwrap();
        }
        market.reset_all();
        let price = market.next_sample("X US Equity").unwrap();
        assert!((0.0..10_000.0).contains(&price));
        assert_eq!(market.history("X US Equity"), vec![price]);
    }

    #[test]
    fn test_reset_clears_active_rally() {
        let config = SimulationConfig::default()
            .with_seed(10)
            .with_rally_probability(1.0);
        let market = MarketSimulator::new(config).unwrap();
        let name = "AAPL US Equity";

        let mut guard = 0;
        while !market.is_rally_active(name) {
            market.next_sample(name).unwrap();
            guard += 1;
            assert!(guard < 10_000, "rally never started");
        }

        market.reset(name);
        assert!(!market.is_rally_active(name));
        assert!(market.history(name).is_empty());

        let seed = market.next_sample(name).unwrap();
        assert!((1.0..10_000.0).contains(&seed));
        assert_eq!(seed.fract(), 0.0);
        assert_eq!(market.history(name), vec![seed]);
        assert!(!market.is_rally_active(name));
    }

    #[test]
    fn test_reset_all_clears_every_rally() {
        let config = SimulationConfig::default()
            .with_seed(11)
            .with_rally_probability(1.0);
        let market = MarketSimulator::new(config).unwrap();
        let names = ["AAPL US Equity", "NVDA US Equity"];

        for name in names {
            let mut guard = 0;
            while !market.is_rally_active(name) {
                market.next_sample(name).unwrap();
                guard += 1;
                assert!(guard < 10_000, "rally never started on {}", name);
            }
        }

        market.reset_all();
        for name in names {
            assert!(!market.is_rally_active(name));
            assert!(market.history(name).is_empty());
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulationConfig::default();
        config.general_range = DrawRange::new(5, 5);
        assert!(MarketSimulator::new(config).is_err());
    }

    #[test]
    fn test_instruments_sorted() {
        let market = seeded(9);
        market.next_sample("b Comdty").unwrap();
        market.next_sample("a Comdty").unwrap();
        assert_eq!(market.instruments(), vec!["a Comdty", "b Comdty"]);
    }
}
