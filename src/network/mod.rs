//! The simple recurrent network: an input layer and a fully recurrent hidden
//! layer feeding a sigmoid output layer, trained with backpropagation through
//! time.
//!
//! Weights are stored row-major as `from x to`. The input and hidden layers
//! each carry a trailing bias unit pinned to 1.0, so `ih` is
//! `(in + 1) x hidden` and `ho` is `(hidden + 1) x out`. The recurrent matrix
//! `hh` has no bias row.

pub mod damage;
pub mod loss;
pub mod weights_io;

pub use damage::WeightMatrix;
pub use loss::ErrorFunction;

use crate::{
    constants::{ROUTINE_BPTT_PADDING, ROUTINE_PENALTY_WEIGHT},
    error::NetworkError,
    maths::sigmoid,
    random::uniform,
    serialize::{deserialize_matrix, serialize_matrix},
    training::{Sequence, TrainingSet},
};
use rand::RngCore;
use rulinalg::matrix::{BaseMatrix, Matrix};
use serde::{Deserialize, Serialize};

/// The three weight matrices of a network, or a delta buffer shaped like them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    #[serde(serialize_with = "serialize_matrix", deserialize_with = "deserialize_matrix")]
    pub ih: Matrix<f64>,
    #[serde(serialize_with = "serialize_matrix", deserialize_with = "deserialize_matrix")]
    pub hh: Matrix<f64>,
    #[serde(serialize_with = "serialize_matrix", deserialize_with = "deserialize_matrix")]
    pub ho: Matrix<f64>,
}

impl Weights {
    pub fn zeros(in_width: usize, hidden_width: usize, out_width: usize) -> Self {
        Self {
            ih: Matrix::zeros(in_width + 1, hidden_width),
            hh: Matrix::zeros(hidden_width, hidden_width),
            ho: Matrix::zeros(hidden_width + 1, out_width),
        }
    }

    /// `(in, hidden, out)` widths, if the three shapes agree with each other
    pub fn dimensions(&self) -> Result<(usize, usize, usize), NetworkError> {
        let in_width = self.ih.rows().saturating_sub(1);
        let hidden_width = self.ih.cols();
        let out_width = self.ho.cols();
        if in_width == 0 || hidden_width == 0 || out_width == 0 {
            return Err(NetworkError::ZeroDimension(in_width, hidden_width, out_width));
        }
        let mismatch = |what, expected, actual| {
            (expected != actual).then_some(NetworkError::WidthMismatch {
                what,
                expected,
                actual,
            })
        };
        let fault = mismatch("hidden > hidden rows", hidden_width, self.hh.rows())
            .or_else(|| mismatch("hidden > hidden columns", hidden_width, self.hh.cols()))
            .or_else(|| mismatch("hidden > output rows", hidden_width + 1, self.ho.rows()));
        match fault {
            Some(e) => Err(e),
            None => Ok((in_width, hidden_width, out_width)),
        }
    }

    pub fn matrix(&self, which: WeightMatrix) -> &Matrix<f64> {
        match which {
            WeightMatrix::InputHidden => &self.ih,
            WeightMatrix::HiddenHidden => &self.hh,
            WeightMatrix::HiddenOutput => &self.ho,
        }
    }

    fn matrix_mut(&mut self, which: WeightMatrix) -> &mut Matrix<f64> {
        match which {
            WeightMatrix::InputHidden => &mut self.ih,
            WeightMatrix::HiddenHidden => &mut self.hh,
            WeightMatrix::HiddenOutput => &mut self.ho,
        }
    }

    fn for_each_mut<F: FnMut(&mut f64)>(&mut self, mut f: F) {
        for m in [&mut self.ih, &mut self.hh, &mut self.ho] {
            m.mut_data().iter_mut().for_each(&mut f);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    in_width: usize,
    hidden_width: usize,
    out_width: usize,
    weights: Weights,
    deltas: Weights,
    units_in: Vec<f64>,
    units_hidden: Vec<f64>,
    units_out: Vec<f64>,
    net_hidden: Vec<f64>,
}

impl Network {
    /// A network with all weights zero, hidden units at 0 and biases at 1
    pub fn new(
        in_width: usize,
        hidden_width: usize,
        out_width: usize,
    ) -> Result<Self, NetworkError> {
        if in_width == 0 || hidden_width == 0 || out_width == 0 {
            return Err(NetworkError::ZeroDimension(in_width, hidden_width, out_width));
        }
        Ok(Self::from_parts(Weights::zeros(in_width, hidden_width, out_width)))
    }

    /// Build a network around existing weights, checking their shapes
    pub fn from_weights(weights: Weights) -> Result<Self, NetworkError> {
        weights.dimensions()?;
        Ok(Self::from_parts(weights))
    }

    fn from_parts(weights: Weights) -> Self {
        let in_width = weights.ih.rows() - 1;
        let hidden_width = weights.ih.cols();
        let out_width = weights.ho.cols();
        let mut units_in = vec![0.; in_width + 1];
        units_in[in_width] = 1.;
        let mut units_hidden = vec![0.; hidden_width + 1];
        units_hidden[hidden_width] = 1.;
        Self {
            in_width,
            hidden_width,
            out_width,
            deltas: Weights::zeros(in_width, hidden_width, out_width),
            weights,
            units_in,
            units_hidden,
            units_out: vec![0.; out_width],
            net_hidden: vec![0.; hidden_width],
        }
    }

    pub fn in_width(&self) -> usize {
        self.in_width
    }

    pub fn hidden_width(&self) -> usize {
        self.hidden_width
    }

    pub fn out_width(&self) -> usize {
        self.out_width
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.in_width, self.hidden_width, self.out_width)
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Raw row-major storage of one weight matrix
    pub fn weights_mut(&mut self, which: WeightMatrix) -> &mut [f64] {
        self.weights.matrix_mut(which).mut_data()
    }

    /// Accumulated weight changes since the last [Network::clear_deltas]
    pub fn deltas(&self) -> &Weights {
        &self.deltas
    }

    /// Most recent input, without the bias unit
    pub fn input(&self) -> &[f64] {
        &self.units_in[..self.in_width]
    }

    /// Current hidden activations, without the bias unit
    pub fn hidden(&self) -> &[f64] {
        &self.units_hidden[..self.hidden_width]
    }

    pub fn output(&self) -> &[f64] {
        &self.units_out
    }

    /// Every weight uniform on [-range, range)
    pub fn randomize_weights(&mut self, rng: &mut impl RngCore, range: f64) {
        self.weights.for_each_mut(|w| *w = uniform(rng, -range, range));
    }

    /// Every hidden unit uniform on [0, 1)
    pub fn randomize_hidden(&mut self, rng: &mut impl RngCore) {
        for h in &mut self.units_hidden[..self.hidden_width] {
            *h = uniform(rng, 0., 1.);
        }
    }

    /// `values` must be [Network::hidden_width] wide
    pub fn set_hidden(&mut self, values: &[f64]) {
        self.units_hidden[..self.hidden_width].copy_from_slice(values);
    }

    /// `input` must be [Network::in_width] wide
    pub fn set_input(&mut self, input: &[f64]) {
        self.units_in[..self.in_width].copy_from_slice(input);
    }

    /// Step with the output computed from the previous hidden state, then
    /// advance the hidden state. This is the ordering BPTT differentiates.
    pub fn propagate(&mut self, input: &[f64]) {
        self.set_input(input);
        self.update_output();
        self.update_hidden();
    }

    /// Step with the hidden state advanced first, so the output reflects the
    /// current input. Used for testing and closed-loop runs.
    pub fn propagate2(&mut self, input: &[f64]) {
        self.set_input(input);
        self.update_hidden();
        self.update_output();
    }

    fn update_hidden(&mut self) {
        let (ih, hh) = (&self.weights.ih, &self.weights.hh);
        for k in 0..self.hidden_width {
            let from_input: f64 = (0..=self.in_width)
                .map(|i| self.units_in[i] * ih[[i, k]])
                .sum();
            let from_context: f64 = (0..self.hidden_width)
                .map(|j| self.units_hidden[j] * hh[[j, k]])
                .sum();
            self.net_hidden[k] = from_input + from_context;
        }
        for k in 0..self.hidden_width {
            self.units_hidden[k] = sigmoid(self.net_hidden[k]);
        }
    }

    fn update_output(&mut self) {
        let ho = &self.weights.ho;
        for o in 0..self.out_width {
            let net: f64 = (0..=self.hidden_width)
                .map(|j| self.units_hidden[j] * ho[[j, o]])
                .sum();
            self.units_out[o] = sigmoid(net);
        }
    }

    /// Run BPTT over one sequence from the current hidden state and add the
    /// resulting weight changes into the delta buffers.
    ///
    /// The sequence is followed by a zero-input padding step. The output at
    /// step `t` is scored against the target of pattern `t - 1`, so the first
    /// step carries no error. With `penalty`, each hidden unit's derivative is
    /// augmented by a term pulling it towards its previous activation.
    pub fn calculate_weight_changes(
        &mut self,
        sequence: &Sequence,
        error_fn: ErrorFunction,
        penalty: bool,
    ) {
        let n = sequence.len();
        let steps = n + ROUTINE_BPTT_PADDING;
        let (nh, no) = (self.hidden_width, self.out_width);
        let zeros = vec![0.; self.in_width];
        let input_at = |t: usize| {
            if (1..=n).contains(&t) {
                &sequence.patterns[t - 1].input
            } else {
                &zeros
            }
        };

        let mut hidden = vec![vec![0.; nh]; steps];
        let mut output = vec![vec![0.; no]; steps];
        let mut error = vec![vec![0.; no]; steps];
        hidden[0].copy_from_slice(self.hidden());
        output[0].copy_from_slice(self.output());

        for t in 1..steps {
            self.propagate(input_at(t));
            hidden[t].copy_from_slice(self.hidden());
            output[t].copy_from_slice(self.output());
            if t >= 2 {
                let target = &sequence.patterns[t - 2].target;
                for o in 0..no {
                    error[t][o] = error_fn.training_error(target[o], output[t][o]);
                }
            }
        }

        let mut delta_hidden = vec![vec![0.; nh]; steps];
        let mut delta_output = vec![vec![0.; no]; steps];
        let (hh, ho) = (&self.weights.hh, &self.weights.ho);
        for t in (1..steps).rev() {
            for o in 0..no {
                let y = output[t][o];
                delta_output[t][o] = error[t][o] * y * (1. - y);
            }
            for k in 0..nh {
                let mut sum = 0.;
                if t + 1 < steps {
                    for o in 0..no {
                        sum += ho[[k, o]] * delta_output[t + 1][o];
                    }
                    for j in 0..nh {
                        sum += hh[[k, j]] * delta_hidden[t + 1][j];
                    }
                }
                let y = hidden[t][k];
                let mut factor = y * (1. - y);
                if penalty {
                    factor += 2. * ROUTINE_PENALTY_WEIGHT * (hidden[t][k] - hidden[t - 1][k]);
                }
                delta_hidden[t][k] = sum * factor;
            }
        }

        let Weights { ih, hh, ho } = &mut self.deltas;
        for t in 1..steps {
            let input = input_at(t);
            let previous = &hidden[t - 1];
            for (k, &d) in delta_hidden[t].iter().enumerate() {
                for (i, x) in input.iter().enumerate() {
                    ih[[i, k]] -= d * x;
                }
                ih[[self.in_width, k]] -= d;
                for (j, h) in previous.iter().enumerate() {
                    hh[[j, k]] -= d * h;
                }
            }
            for (o, &d) in delta_output[t].iter().enumerate() {
                for (j, h) in previous.iter().enumerate() {
                    ho[[j, o]] -= d * h;
                }
                ho[[nh, o]] -= d;
            }
        }
    }

    /// `w -= rate * delta` for every weight
    pub fn adjust_weights(&mut self, rate: f64) {
        let Self {
            weights, deltas, ..
        } = self;
        for (w, d) in [
            (&mut weights.ih, &deltas.ih),
            (&mut weights.hh, &deltas.hh),
            (&mut weights.ho, &deltas.ho),
        ] {
            for (w, d) in w.mut_data().iter_mut().zip(d.data()) {
                *w -= rate * d;
            }
        }
    }

    pub fn clear_deltas(&mut self) {
        self.deltas.for_each_mut(|d| *d = 0.);
    }

    /// Mean per-unit `metric` over every pattern of `set`, each sequence
    /// starting from a fresh random hidden state.
    pub fn test(
        &mut self,
        set: &TrainingSet,
        rng: &mut impl RngCore,
        metric: ErrorFunction,
    ) -> f64 {
        let mut total = 0.;
        let mut count = 0;
        for sequence in set.iter() {
            self.randomize_hidden(rng);
            for pattern in sequence.iter() {
                self.propagate2(&pattern.input);
                total += metric.metric(&pattern.target, &self.units_out);
                count += 1;
            }
        }
        if count == 0 {
            0.
        } else {
            total / (count * self.out_width) as f64
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        assert_f64_approx, assert_slice_approx,
        maths::sigmoid,
        random::{uniform, WyRng},
        training::Pattern,
    };

    fn toy() -> Network {
        // 1 input, 2 hidden, 1 output
        let mut net = Network::new(1, 2, 1).unwrap();
        net.weights_mut(WeightMatrix::InputHidden)
            .copy_from_slice(&[1., -1., 0.5, 0.25]);
        net.weights_mut(WeightMatrix::HiddenHidden)
            .copy_from_slice(&[2., 0., 0., -2.]);
        net.weights_mut(WeightMatrix::HiddenOutput)
            .copy_from_slice(&[1.5, -0.5, 0.1]);
        net
    }

    fn random_sequence(rng: &mut WyRng, len: usize, in_w: usize, out_w: usize) -> Sequence {
        let mut seq = Sequence::new("random");
        for _ in 0..len {
            seq.push(Pattern::new(
                (0..in_w).map(|_| uniform(rng, 0., 1.).round()).collect(),
                (0..out_w).map(|_| uniform(rng, 0.1, 0.9)).collect(),
            ));
        }
        seq
    }

    /// The objective BPTT differentiates, from hidden state `h0`
    fn sequence_error(net: &Network, h0: &[f64], seq: &Sequence, error_fn: ErrorFunction) -> f64 {
        let mut net = net.clone();
        net.set_hidden(h0);
        let zeros = vec![0.; net.in_width()];
        let mut total = 0.;
        for t in 1..=seq.len() + 1 {
            let input = if t <= seq.len() { &seq.patterns[t - 1].input } else { &zeros };
            net.propagate(input);
            if t >= 2 {
                let target = &seq.patterns[t - 2].target;
                total += match error_fn {
                    ErrorFunction::SumSquare => 0.5 * error_fn.metric(target, net.output()),
                    _ => error_fn.metric(target, net.output()),
                };
            }
        }
        total
    }

    fn gradient_check(error_fn: ErrorFunction, len: usize) {
        let mut rng = WyRng::seeded(0x5eed + len as u64);
        let mut net = Network::new(2, 3, 2).unwrap();
        net.randomize_weights(&mut rng, 1.);
        let seq = random_sequence(&mut rng, len, 2, 2);
        let h0: Vec<f64> = (0..3).map(|_| uniform(&mut rng, 0., 1.)).collect();

        net.set_hidden(&h0);
        net.clear_deltas();
        net.calculate_weight_changes(&seq, error_fn, false);
        let analytic = net.deltas().clone();

        let eps = 1e-6;
        for which in WeightMatrix::ALL {
            let count = net.weights().matrix(which).data().len();
            for idx in 0..count {
                let mut plus = net.clone();
                plus.weights_mut(which)[idx] += eps;
                let mut minus = net.clone();
                minus.weights_mut(which)[idx] -= eps;
                let numeric = (sequence_error(&plus, &h0, &seq, error_fn)
                    - sequence_error(&minus, &h0, &seq, error_fn))
                    / (2. * eps);
                let got = analytic.matrix(which).data()[idx];
                let scale = numeric.abs().max(got.abs());
                assert!(
                    (numeric - got).abs() <= 1e-3 * scale + 1e-8,
                    "{which:?}[{idx}] {error_fn}: bptt {got} vs numeric {numeric}"
                );
            }
        }
    }

    #[test]
    fn test_zero_dimension() {
        assert!(matches!(
            Network::new(0, 3, 2),
            Err(NetworkError::ZeroDimension(0, 3, 2))
        ));
        assert!(Network::new(3, 0, 2).is_err());
        assert!(Network::new(3, 2, 0).is_err());
    }

    #[test]
    fn test_bias_units() {
        let mut rng = WyRng::seeded(1);
        let mut net = Network::new(3, 4, 2).unwrap();
        net.randomize_weights(&mut rng, 1.);
        net.randomize_hidden(&mut rng);
        net.propagate(&[1., 0., 1.]);
        net.propagate2(&[0., 1., 0.]);
        assert_f64_approx!(net.units_in[3], 1.);
        assert_f64_approx!(net.units_hidden[4], 1.);
        assert_eq!(net.hidden().len(), 4);
    }

    #[test]
    fn test_propagate_orderings() {
        let h0 = [0.2, 0.7];
        let mut a = toy();
        a.set_hidden(&h0);
        a.propagate(&[1.]);
        let mut b = toy();
        b.set_hidden(&h0);
        b.propagate2(&[1.]);

        // both orderings advance the hidden state identically
        let h1 = [
            sigmoid(1. + 0.5 + 2. * h0[0]),
            sigmoid(-1. + 0.25 - 2. * h0[1]),
        ];
        assert_slice_approx!(a.hidden(), h1, 1e-12);
        assert_slice_approx!(b.hidden(), h1, 1e-12);

        // but read the output off different hidden states
        assert_slice_approx!(a.output(), [sigmoid(1.5 * h0[0] - 0.5 * h0[1] + 0.1)], 1e-12);
        assert_slice_approx!(b.output(), [sigmoid(1.5 * h1[0] - 0.5 * h1[1] + 0.1)], 1e-12);
        assert!((a.output()[0] - b.output()[0]).abs() > 1e-3);
    }

    #[test]
    fn test_propagate_deterministic() {
        let mut rng = WyRng::seeded(7);
        let mut net = Network::new(4, 5, 3).unwrap();
        net.randomize_weights(&mut rng, 1.);
        net.randomize_hidden(&mut rng);
        let mut copy = net.clone();
        for input in [[1., 0., 0., 1.], [0., 1., 1., 0.], [0.5, 0.5, 0., 0.]] {
            net.propagate(&input);
            copy.propagate(&input);
            assert_eq!(net.output(), copy.output());
            assert_eq!(net.hidden(), copy.hidden());
        }
        assert!(net.output().iter().all(|y| *y > 0. && *y < 1.));
    }

    #[test]
    fn test_gradient_sum_square() {
        gradient_check(ErrorFunction::SumSquare, 2);
        gradient_check(ErrorFunction::SumSquare, 3);
    }

    #[test]
    fn test_gradient_cross_entropy() {
        gradient_check(ErrorFunction::CrossEntropy, 2);
        gradient_check(ErrorFunction::CrossEntropy, 3);
    }

    #[test]
    fn test_soft_max_learns_nothing() {
        let mut rng = WyRng::seeded(3);
        let mut net = Network::new(2, 3, 2).unwrap();
        net.randomize_weights(&mut rng, 1.);
        let seq = random_sequence(&mut rng, 3, 2, 2);
        net.calculate_weight_changes(&seq, ErrorFunction::SoftMax, false);
        assert_eq!(net.deltas(), &Weights::zeros(2, 3, 2));
    }

    #[test]
    fn test_penalty_changes_hidden_deltas_only() {
        let mut rng = WyRng::seeded(11);
        let mut net = Network::new(2, 3, 2).unwrap();
        net.randomize_weights(&mut rng, 1.);
        let seq = random_sequence(&mut rng, 3, 2, 2);
        let h0 = [0.3, 0.6, 0.9];

        let mut plain = net.clone();
        plain.set_hidden(&h0);
        plain.calculate_weight_changes(&seq, ErrorFunction::SumSquare, false);
        let mut penalised = net.clone();
        penalised.set_hidden(&h0);
        penalised.calculate_weight_changes(&seq, ErrorFunction::SumSquare, true);

        assert_eq!(plain.deltas().ho, penalised.deltas().ho);
        assert_ne!(plain.deltas().ih, penalised.deltas().ih);
    }

    #[test]
    fn test_adjust_and_clear() {
        let mut rng = WyRng::seeded(5);
        let mut net = Network::new(2, 2, 1).unwrap();
        net.randomize_weights(&mut rng, 1.);
        let before = net.weights().clone();
        let seq = random_sequence(&mut rng, 2, 2, 1);
        net.calculate_weight_changes(&seq, ErrorFunction::SumSquare, false);
        let deltas = net.deltas().clone();
        net.adjust_weights(0.5);
        for which in WeightMatrix::ALL {
            let expected: Vec<f64> = before
                .matrix(which)
                .data()
                .iter()
                .zip(deltas.matrix(which).data())
                .map(|(w, d)| w - 0.5 * d)
                .collect();
            assert_slice_approx!(net.weights().matrix(which).data(), expected);
        }
        net.clear_deltas();
        assert_eq!(net.deltas(), &Weights::zeros(2, 2, 1));
    }

    #[test]
    fn test_training_reduces_error() {
        let mut rng = WyRng::seeded(21);
        let mut net = Network::new(2, 4, 2).unwrap();
        net.randomize_weights(&mut rng, 1.);
        let mut set = TrainingSet::new(2, 2);
        let mut seq = Sequence::new("alternate");
        for i in 0..4 {
            let (a, b) = if i % 2 == 0 { (1., 0.) } else { (0., 1.) };
            seq.push(Pattern::new(vec![a, b], vec![b, a]));
        }
        set.push(seq).unwrap();

        let mut probe = WyRng::seeded(99);
        let before = net.clone().test(&set, &mut probe, ErrorFunction::SumSquare);
        for _ in 0..300 {
            net.randomize_hidden(&mut rng);
            net.calculate_weight_changes(&set.sequences[0], ErrorFunction::SumSquare, false);
            net.adjust_weights(0.5);
            net.clear_deltas();
        }
        let mut probe = WyRng::seeded(99);
        let after = net.test(&set, &mut probe, ErrorFunction::SumSquare);
        assert!(after < before, "{after} >= {before}");
    }

    #[test]
    fn test_empty_set_scores_zero() {
        let mut rng = WyRng::seeded(0);
        let mut net = Network::new(2, 2, 2).unwrap();
        let score = net.test(&TrainingSet::new(2, 2), &mut rng, ErrorFunction::SumSquare);
        assert_f64_approx!(score, 0.);
    }

    #[test]
    fn test_from_weights_checks_shapes() {
        let mut w = Weights::zeros(3, 4, 2);
        assert_eq!(Network::from_weights(w.clone()).unwrap().dimensions(), (3, 4, 2));
        w.hh = Matrix::zeros(4, 3);
        assert!(matches!(
            Network::from_weights(w),
            Err(NetworkError::WidthMismatch { .. })
        ));
    }
}
