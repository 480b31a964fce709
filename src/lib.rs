pub mod config;
pub mod constants;
pub mod context;
pub mod driver;
pub mod error;
pub mod macros;
pub mod maths;
pub mod network;
pub mod random;
pub mod serialize;
pub mod training;
pub mod world;

pub use config::Config;
pub use context::SimulationContext;
pub use driver::{lesion_sweep, Episode, Report, UpdateMode};
pub use network::{ErrorFunction, Network, WeightMatrix, Weights};
pub use random::WyRng;
pub use training::{Pattern, Sequence, TrainingSet};
pub use world::{Action, ActionError, Task, TaskBase, World};
