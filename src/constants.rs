//! Centralized constants for routine simulation parameters.
//!
//! All configurable parameters are defined here with the `ROUTINE_` prefix.
//! [crate::config::Config] takes its defaults from these values.

// ============================================================================
// Network Dimensions
// ============================================================================

/// Width of the input layer: 20 fixated-object units + 19 held-object units
pub const ROUTINE_IN_WIDTH: usize = 39;

/// Width of the hidden (and context) layer
pub const ROUTINE_HIDDEN_WIDTH: usize = 50;

/// Width of the output layer, one unit per action
pub const ROUTINE_OUT_WIDTH: usize = 19;

// ============================================================================
// Training Parameters
// ============================================================================

/// Weight learning rate
pub const ROUTINE_LEARNING_RATE: f64 = 0.1;

/// Initial weights are drawn uniformly from [-range, range)
pub const ROUTINE_INITIAL_WEIGHT_RANGE: f64 = 1.0;

/// Number of training cycles the batch driver runs
pub const ROUTINE_TRAINING_CYCLES: usize = 20_000;

/// Report error metrics every this many cycles
pub const ROUTINE_REPORT_INTERVAL: usize = 500;

/// Coefficient of the hidden-unit stability penalty
pub const ROUTINE_PENALTY_WEIGHT: f64 = 0.05;

/// Number of steps past the end of a sequence that BPTT runs the network for.
/// Step 0 is the starting state, so a sequence of n patterns uses n + 2 slots.
pub const ROUTINE_BPTT_PADDING: usize = 2;

// ============================================================================
// World Parameters
// ============================================================================

/// Hard cap on the number of actions in one closed-loop episode
pub const ROUTINE_MAX_EPISODE_STEPS: usize = 100;

/// Number of binary visual features describing one object
pub const ROUTINE_FEATURE_COUNT: usize = 18;

/// Euclidean distance under which a feature vector matches a canonical description
pub const ROUTINE_DESCRIBE_THRESHOLD: f64 = 0.1;

// ============================================================================
// Output
// ============================================================================

/// Default prefix of weight files written by the batch driver
pub const ROUTINE_WEIGHTS_PREFIX: &str = "srn";

/// Default training sequence file read by the batch driver
pub const ROUTINE_TRAINING_FILE: &str = "data/coffee.seq";
