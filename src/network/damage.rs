//! Damage operators for lesion studies. None of these touch the delta buffers,
//! so they can be applied to a trained network or a copy of one at any time.

use super::Network;
use crate::{error::NetworkError, random::normal};
use core::fmt;
use rand::RngCore;
use rand_distr::{Bernoulli, Distribution};
use rulinalg::matrix::BaseMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightMatrix {
    InputHidden,
    HiddenHidden,
    HiddenOutput,
}

impl WeightMatrix {
    pub const ALL: [WeightMatrix; 3] = [
        WeightMatrix::InputHidden,
        WeightMatrix::HiddenHidden,
        WeightMatrix::HiddenOutput,
    ];
}

impl fmt::Display for WeightMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WeightMatrix::InputHidden => "input > hidden",
            WeightMatrix::HiddenHidden => "hidden > hidden",
            WeightMatrix::HiddenOutput => "hidden > output",
        })
    }
}

fn coin(p: f64) -> Result<Bernoulli, NetworkError> {
    Bernoulli::new(p).map_err(|_| NetworkError::Severity(p))
}

impl Network {
    /// Add `normal(0, sqrt(variance))` noise to every weight of one matrix
    pub fn perturb_weights(
        &mut self,
        which: WeightMatrix,
        variance: f64,
        rng: &mut impl RngCore,
    ) {
        let sd = variance.sqrt();
        for w in self.weights_mut(which) {
            *w += normal(rng, 0., sd);
        }
    }

    /// Zero each weight of one matrix independently with probability
    /// `severity`. Returns how many weights were zeroed.
    pub fn lesion_weights(
        &mut self,
        which: WeightMatrix,
        severity: f64,
        rng: &mut impl RngCore,
    ) -> Result<usize, NetworkError> {
        let coin = coin(severity)?;
        let mut zeroed = 0;
        for w in self.weights_mut(which) {
            if coin.sample(rng) {
                *w = 0.;
                zeroed += 1;
            }
        }
        Ok(zeroed)
    }

    /// Zero whole rows of the recurrent matrix with probability `severity`,
    /// silencing every outgoing context connection of the affected units.
    /// Returns how many rows were zeroed.
    pub fn ablate_context(
        &mut self,
        severity: f64,
        rng: &mut impl RngCore,
    ) -> Result<usize, NetworkError> {
        let coin = coin(severity)?;
        let mut zeroed = 0;
        let width = self.weights.hh.cols();
        for row in self.weights.hh.mut_data().chunks_mut(width) {
            if coin.sample(rng) {
                row.fill(0.);
                zeroed += 1;
            }
        }
        Ok(zeroed)
    }

    /// Multiply every weight in all three matrices by `proportion`
    pub fn scale_weights(&mut self, proportion: f64) {
        self.weights.for_each_mut(|w| *w *= proportion);
    }

    /// Add `normal(0, sqrt(variance))` noise to the current hidden activations
    pub fn inject_noise(&mut self, variance: f64, rng: &mut impl RngCore) {
        let sd = variance.sqrt();
        let width = self.hidden_width;
        for h in &mut self.units_hidden[..width] {
            *h += normal(rng, 0., sd);
        }
    }
}
