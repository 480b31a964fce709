//! The simulation's random stream and the draws built on it.
//!
//! Every stochastic operation in the crate takes its generator explicitly, so
//! two simulations seeded alike replay identically.

use core::cmp::min;
use rand::{Rng, RngCore};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct WyRng {
    state: u64,
}

impl WyRng {
    pub fn seeded(state: u64) -> Self {
        Self { state }
    }

    /// A stream seeded from the wall clock
    pub fn from_clock() -> Self {
        Self::seeded(seed_clock())
    }
}

impl RngCore for WyRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        const WY_CONST_0: u64 = 0x2d35_8dcc_aa6c_78a5;
        const WY_CONST_1: u64 = 0x8bb8_4b93_962e_acc9;
        self.state = self.state.wrapping_add(WY_CONST_0);
        let t = u128::from(self.state) * u128::from(self.state ^ WY_CONST_1);
        (t as u64) ^ (t >> 64) as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut idx = 0;
        while idx < dst.len() {
            let lim = min(8, dst.len() - idx);
            dst[idx..idx + lim].copy_from_slice(&self.next_u64().to_ne_bytes()[..lim]);
            idx += lim;
        }
    }
}

/// Seed from nanoseconds since the epoch. A clock before 1970 seeds with 0.
pub fn seed_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Uniform draw on [low, high)
pub fn uniform(rng: &mut impl RngCore, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.random::<f64>()
}

/// Normal draw via the Box-Muller transform.
///
/// Both underlying draws lie on (0, 1], so the logarithm is always finite.
pub fn normal(rng: &mut impl RngCore, mean: f64, sd: f64) -> f64 {
    let r1 = 1. - rng.random::<f64>();
    let r2 = 1. - rng.random::<f64>();
    mean + sd * (-2. * r1.ln()).sqrt() * (2. * core::f64::consts::PI * r2).cos()
}

/// Uniform integer on [0, n). `n` must be non-zero.
pub fn random_int(rng: &mut impl RngCore, n: usize) -> usize {
    rng.random_range(0..n)
}
