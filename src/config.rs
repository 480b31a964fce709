//! Run configuration. Every field defaults to its `ROUTINE_*` constant, so a
//! JSON config only needs to name what it changes.

use crate::{
    constants::*,
    driver::UpdateMode,
    error::ConfigError,
    network::ErrorFunction,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub in_width: usize,
    pub hidden_width: usize,
    pub out_width: usize,
    pub learning_rate: f64,
    pub weight_range: f64,
    pub cycles: usize,
    pub report_every: usize,
    pub error_function: ErrorFunction,
    pub update_mode: UpdateMode,
    pub penalty: bool,
    pub max_episode_steps: usize,
    pub training_file: PathBuf,
    pub weights_prefix: String,
    pub networks: usize,
    /// Fixed seed for reproducible runs; the clock seeds otherwise
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            in_width: ROUTINE_IN_WIDTH,
            hidden_width: ROUTINE_HIDDEN_WIDTH,
            out_width: ROUTINE_OUT_WIDTH,
            learning_rate: ROUTINE_LEARNING_RATE,
            weight_range: ROUTINE_INITIAL_WEIGHT_RANGE,
            cycles: ROUTINE_TRAINING_CYCLES,
            report_every: ROUTINE_REPORT_INTERVAL,
            error_function: ErrorFunction::SumSquare,
            update_mode: UpdateMode::ByEpoch,
            penalty: false,
            max_episode_steps: ROUTINE_MAX_EPISODE_STEPS,
            training_file: PathBuf::from(ROUTINE_TRAINING_FILE),
            weights_prefix: ROUTINE_WEIGHTS_PREFIX.to_string(),
            networks: 1,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Weight file of the `index`th network of a run
    pub fn weights_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}_{index}.weights", self.weights_prefix))
    }
}
