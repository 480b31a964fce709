//! Activation function and the vector metrics used to score network output.

use core::f64::consts::E;

pub fn sigmoid(x: f64) -> f64 {
    1. / (1. + E.powf(-x))
}

pub fn sigmoid_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1. - s)
}

/// Sum of squared differences between two equal-width vectors
pub fn sum_square_difference(v1: &[f64], v2: &[f64]) -> f64 {
    debug_assert_eq!(v1.len(), v2.len());
    v1.iter().zip(v2).map(|(a, b)| (a - b) * (a - b)).sum()
}

/// sqrt(SSD / width)
pub fn rms_difference(v1: &[f64], v2: &[f64]) -> f64 {
    if v1.is_empty() {
        return 0.;
    }
    (sum_square_difference(v1, v2) / v1.len() as f64).sqrt()
}

/// Cross-entropy of `actual` against `desired`. Not clamped: a saturated unit
/// that is wrong yields `inf`.
pub fn cross_entropy(desired: &[f64], actual: &[f64]) -> f64 {
    debug_assert_eq!(desired.len(), actual.len());
    desired
        .iter()
        .zip(actual)
        .map(|(d, y)| -(d * y.ln() + (1. - d) * (1. - y).ln()))
        .sum()
}

pub fn euclidean_distance(v1: &[f64], v2: &[f64]) -> f64 {
    sum_square_difference(v1, v2).sqrt()
}

/// Mean pairwise Euclidean distance over a set of vectors; 0 for fewer than two
pub fn variability(vectors: &[Vec<f64>]) -> f64 {
    let n = vectors.len();
    if n < 2 {
        return 0.;
    }
    let mut total = 0.;
    for i in 0..n {
        for j in (i + 1)..n {
            total += euclidean_distance(&vectors[i], &vectors[j]);
        }
    }
    total / (n * (n - 1) / 2) as f64
}
