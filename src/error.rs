use crate::world::templates::TemplateError;
use std::{fmt, io};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network dimensions must be non-zero, got {0}I > {1}H > {2}O")]
    ZeroDimension(usize, usize, usize),
    #[error("{what} has width {actual}, network expects {expected}")]
    WidthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("damage severity {0} is not a probability")]
    Severity(f64),
}

/// Which of the three weight matrices a weight file stage refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    InputHidden = 1,
    HiddenHidden = 2,
    HiddenOutput = 3,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::InputHidden => "input > hidden",
            Stage::HiddenHidden => "hidden > hidden",
            Stage::HiddenOutput => "hidden > output",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightsErrorKind {
    Header,
    Alloc,
    Read,
}

#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("weights {stage}: missing or malformed header")]
    Header { stage: Stage },
    #[error("weights {stage}: cannot allocate a {rows}x{cols} matrix")]
    Alloc {
        stage: Stage,
        rows: usize,
        cols: usize,
    },
    #[error("weights {stage}: short or malformed data at row {row}")]
    Read { stage: Stage, row: usize },
    #[error("weights i/o: {0}")]
    Io(#[from] io::Error),
}

impl WeightsError {
    pub fn kind(&self) -> Option<(Stage, WeightsErrorKind)> {
        match self {
            Self::Header { stage } => Some((*stage, WeightsErrorKind::Header)),
            Self::Alloc { stage, .. } => Some((*stage, WeightsErrorKind::Alloc)),
            Self::Read { stage, .. } => Some((*stage, WeightsErrorKind::Read)),
            Self::Io(_) => None,
        }
    }

    /// Integer code: headers 1-3, allocation 4-6, data 7-9, one per stage. I/O is 10.
    pub fn code(&self) -> u8 {
        match self.kind() {
            Some((stage, WeightsErrorKind::Header)) => stage as u8,
            Some((stage, WeightsErrorKind::Alloc)) => 3 + stage as u8,
            Some((stage, WeightsErrorKind::Read)) => 6 + stage as u8,
            None => 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrainingDataError {
    #[error("cannot read training data {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("pattern has {actual} {what} values, set expects {expected}")]
    WidthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("cannot generate training data: {0}")]
    Template(#[from] TemplateError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}
