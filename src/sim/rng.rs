//! Seeded randomness for the simulation
//!
//! Every random decision in a run goes through one `SimRng`, so a seed plus an
//! input sequence fully determines the run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic RNG owned by the simulation state
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform in [0, 1)
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Uniform in [lo, hi); returns `lo` for an empty or inverted range
    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            lo
        } else {
            lo + self.unit() * (hi - lo)
        }
    }

    /// True with probability `p`
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Uniform index in [0, len); `len` must be non-zero
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        if len <= 1 {
            0
        } else {
            self.inner.random_range(0..len)
        }
    }

    /// +1.0 or -1.0
    #[inline]
    pub fn sign(&mut self) -> f32 {
        if self.inner.random::<bool>() { 1.0 } else { -1.0 }
    }

    /// Cumulative-weight roll over `weights`.
    ///
    /// Negative and non-finite weights count as zero. Returns `None` when the
    /// total weight is zero.
    pub fn weighted_index(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights
            .iter()
            .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
            .sum();
        if total <= 0.0 {
            return None;
        }
        let mut roll = self.unit() * total;
        let mut last_positive = None;
        for (i, &w) in weights.iter().enumerate() {
            if !(w.is_finite() && w > 0.0) {
                continue;
            }
            last_positive = Some(i);
            if roll < w {
                return Some(i);
            }
            roll -= w;
        }
        // Float rounding can leave a sliver past the last bucket
        last_positive
    }
}
