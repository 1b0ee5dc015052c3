//! Strictly increasing wall-clock instants.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use trading::Timestamp;

/// Issues UTC instants that never repeat and never go backwards.
///
/// When the wall clock has not advanced past the last issued instant (same
/// tick, or a step back after an NTP correction) the next instant is the last
/// one plus one nanosecond.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_nanos: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Timestamp {
        let wall = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        let mut issued = wall;
        let _ = self
            .last_nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                issued = wall.max(last.saturating_add(1));
                Some(issued)
            });
        Timestamp::from_unix_nanos(issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_instants_strictly_increase() {
        let clock = MonotonicClock::new();
        let mut prev = clock.now();
        for _ in 0..10_000 {
            let next = clock.now();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn test_instants_unique_across_threads() {
        let clock = MonotonicClock::new();
        let all: Vec<Timestamp> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| (0..1_000).map(|_| clock.now()).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        let unique: HashSet<Timestamp> = all.iter().copied().collect();
        assert_eq!(unique.len(), all.len());
    }
}
