//! Error functions the network can be trained and scored with.

use crate::maths::{cross_entropy, sum_square_difference};
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFunction {
    #[default]
    SumSquare,
    CrossEntropy,
    /// Reserved. Both its training error and its metric are 0.
    SoftMax,
}

impl ErrorFunction {
    pub const ALL: [ErrorFunction; 3] = [
        ErrorFunction::SumSquare,
        ErrorFunction::CrossEntropy,
        ErrorFunction::SoftMax,
    ];

    /// Error signal injected at an output unit with target `desired` and
    /// activation `actual`, before the sigmoid derivative is applied.
    pub fn training_error(self, desired: f64, actual: f64) -> f64 {
        match self {
            ErrorFunction::SumSquare => desired - actual,
            ErrorFunction::CrossEntropy => (desired - actual) / (actual * (1. - actual)),
            ErrorFunction::SoftMax => 0.,
        }
    }

    /// Total error of an output vector against its target
    pub fn metric(self, desired: &[f64], actual: &[f64]) -> f64 {
        match self {
            ErrorFunction::SumSquare => sum_square_difference(desired, actual),
            ErrorFunction::CrossEntropy => cross_entropy(desired, actual),
            ErrorFunction::SoftMax => 0.,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorFunction::SumSquare => "sum-square",
            ErrorFunction::CrossEntropy => "cross-entropy",
            ErrorFunction::SoftMax => "soft-max",
        }
    }
}

impl fmt::Display for ErrorFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
