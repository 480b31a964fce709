//! Everything one simulation mutates, owned in one place and passed around by
//! `&mut`. Independent simulations share nothing.

use crate::{
    config::Config,
    error::NetworkError,
    network::Network,
    random::WyRng,
    training::TrainingSet,
    world::{Task, World},
};

#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub world: World,
    pub network: Network,
    pub rng: WyRng,
    pub training: TrainingSet,
}

impl SimulationContext {
    /// A freshly randomized network of the configured shape, and a world set
    /// up for the default coffee task.
    pub fn new(
        config: &Config,
        training: TrainingSet,
        mut rng: WyRng,
    ) -> Result<Self, NetworkError> {
        let (i, o) = (training.in_width, training.out_width);
        if i != config.in_width {
            return Err(NetworkError::WidthMismatch {
                what: "training input",
                expected: config.in_width,
                actual: i,
            });
        }
        if o != config.out_width {
            return Err(NetworkError::WidthMismatch {
                what: "training target",
                expected: config.out_width,
                actual: o,
            });
        }
        let mut network = Network::new(config.in_width, config.hidden_width, config.out_width)?;
        network.randomize_weights(&mut rng, config.weight_range);
        Ok(Self {
            world: World::new(Task::default()),
            network,
            rng,
            training,
        })
    }
}
