//! Every random draw in the pipeline goes through here
//!
//! Layout, distortion and noise all pull their numbers from a
//! [`RandomSource`]. Production code wraps a `rand` generator in
//! [`RngSource`]; tests can seed one or script the draws outright to get
//! byte-identical images.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Where the pipeline gets its randomness
///
/// Only [`int_in`](RandomSource::int_in) and
/// [`uniform`](RandomSource::uniform) are required. The rest are derived
/// from them, but can be overridden to force particular decisions.
pub trait RandomSource {
    /// Integer drawn uniformly from `low..=high`
    ///
    /// Returns `low` when the range is empty.
    fn int_in(&mut self, low: i64, high: i64) -> i64;

    /// Float drawn uniformly between `low` and `high`
    ///
    /// `low > high` is allowed and mirrors the range.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Float drawn uniformly from `[0, 1)`
    fn unit(&mut self) -> f64 {
        self.uniform(0.0, 1.0)
    }

    /// Fair coin: true when a unit draw lands above one half
    fn coin(&mut self) -> bool {
        self.unit() > 0.5
    }

    /// Index drawn uniformly from `0..len`
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.int_in(0, len as i64 - 1) as usize
    }
}

/// Adapter that lets any `rand` generator feed the pipeline
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Hand back the wrapped generator
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RngSource<ThreadRng> {
    /// Thread-local generator, fresh for every call site
    pub fn thread() -> Self {
        Self::new(rand::rng())
    }
}

impl RngSource<StdRng> {
    /// Deterministic generator for reproducible images
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn int_in(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.random_range(low..=high)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.rng.random::<f64>()
    }
}
