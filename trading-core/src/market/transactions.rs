//! Synthetic quantity changes for driving holdings in simulations.

use rand::Rng;
use trading::{Result, ValuationError};

/// A pre-generated sequence of quantity deltas whose running total never
/// goes negative.
///
/// The first delta is a buy in `[1, 1001]`; later ones lie in `[-400, 1001]`
/// and are redrawn until the running total stays non-negative. Applying the
/// sequence to any holding with a non-negative quantity therefore never
/// fails validation.
#[derive(Debug, Clone)]
pub struct TransactionGenerator {
    transactions: Vec<i64>,
    cursor: usize,
}

impl TransactionGenerator {
    /// Generates `size` deltas from the thread-local RNG.
    pub fn new(size: usize) -> Result<Self> {
        Self::with_rng(size, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng>(size: usize, rng: &mut R) -> Result<Self> {
        if size == 0 {
            return Err(ValuationError::InvalidConfig(
                "cannot generate an empty transaction list".to_string(),
            ));
        }

        let mut transactions = Vec::with_capacity(size);
        let mut running = 0i64;
        for i in 0..size {
            let delta = if i == 0 {
                rng.gen_range(1..=1001)
            } else {
                loop {
                    let candidate = rng.gen_range(-400..=1001);
                    if running + candidate >= 0 {
                        break candidate;
                    }
                }
            };
            running += delta;
            transactions.push(delta);
        }

        Ok(Self {
            transactions,
            cursor: 0,
        })
    }

    pub fn transactions(&self) -> &[i64] {
        &self.transactions
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.transactions.len()
    }
}

impl Iterator for TransactionGenerator {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let delta = self.transactions.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_running_total_never_negative() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let generator = TransactionGenerator::with_rng(25, &mut rng).unwrap();
            let first = generator.transactions()[0];
            assert!((1..=1001).contains(&first));
            let mut running = 0;
            for delta in generator.transactions() {
                assert!((-400..=1001).contains(delta));
                running += delta;
                assert!(running >= 0);
            }
        }
    }

    #[test]
    fn test_exhausts_after_size() {
        let mut generator = TransactionGenerator::new(3).unwrap();
        assert_eq!(generator.by_ref().count(), 3);
        assert!(!generator.has_next());
        assert_eq!(generator.next(), None);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            TransactionGenerator::new(0),
            Err(ValuationError::InvalidConfig(_))
        ));
    }
}
