//! Seedable randomness shared by the synthetic backends

use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::PlannerError;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Cloneable handle to one random number generator. A fixed seed makes
/// every synthetic result and every synthetic failure reproducible.
#[derive(Debug, Clone)]
pub struct SharedRng {
    inner: Arc<Mutex<StdRng>>,
}

impl SharedRng {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random::<u64>());
        tracing::debug!(seed, "Seeding synthetic data generator");
        Self {
            inner: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    fn with<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// True with probability `p`, clamped to [0, 1]
    pub fn chance(&self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.with(|rng| rng.random_bool(p))
    }

    /// Uniform value in `[low, high)`
    pub fn uniform(&self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.with(|rng| rng.random_range(low..high))
    }

    /// Uniform integer in `[low, high]`
    pub fn int_between(&self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.with(|rng| rng.random_range(low..=high))
    }

    /// Index drawn with probability proportional to its weight
    pub fn weighted_index(&self, weights: &[u32]) -> usize {
        let total: u32 = weights.iter().sum();
        if total == 0 {
            return 0;
        }
        let mut roll = self.with(|rng| rng.random_range(0..total));
        for (index, weight) in weights.iter().enumerate() {
            if roll < *weight {
                return index;
            }
            roll -= weight;
        }
        weights.len() - 1
    }

    /// Random uppercase alphanumeric code, as handed out by booking systems
    pub fn confirmation_code(&self, len: usize) -> String {
        self.with(|rng| {
            (0..len)
                .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
                .collect()
        })
    }

    /// Fail with `DownstreamUnavailable` with probability `rate`
    pub fn maybe_fail(&self, service: &str, rate: f64, message: &str) -> crate::Result<()> {
        if self.chance(rate) {
            tracing::debug!(service, rate, "Injecting synthetic failure");
            Err(PlannerError::downstream(service, message))
        } else {
            Ok(())
        }
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self::new(None)
    }
}
