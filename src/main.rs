//! Batch trainer: trains one or more networks on the coffee/tea sequences and
//! writes each one's weights to `<prefix>_<i>.weights`.

use clap::Parser;
use core::ops::ControlFlow;
use routine::{
    config::Config,
    context::SimulationContext,
    driver::UpdateMode,
    network::ErrorFunction,
    random::{seed_clock, WyRng},
    training::TrainingSet,
    world::Task,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "routine", about = "Train simple recurrent networks on routine action sequences")]
struct Args {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random stream (defaults to the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Training sequence file
    #[arg(long)]
    training_file: Option<PathBuf>,

    /// Build the training set from the built-in task templates instead of a file
    #[arg(long)]
    generate: bool,

    /// Write the generated training set here before training
    #[arg(long)]
    save_training: Option<PathBuf>,

    /// Number of training cycles
    #[arg(long)]
    cycles: Option<usize>,

    /// Log error metrics every N cycles
    #[arg(long)]
    report_every: Option<usize>,

    /// Number of networks to train
    #[arg(long)]
    networks: Option<usize>,

    /// Weight file prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Train with cross-entropy error instead of sum-square
    #[arg(long)]
    cross_entropy: bool,

    /// Update weights after every sequence, shuffling sequence order
    #[arg(long)]
    by_item: bool,

    /// Enable the hidden-unit stability penalty
    #[arg(long)]
    penalty: bool,

    /// Log a closed-loop coffee episode of each trained network
    #[arg(long)]
    episode: bool,
}

impl Args {
    fn config(&self) -> Result<Config, routine::error::ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        config.seed = self.seed.or(config.seed);
        if let Some(path) = &self.training_file {
            config.training_file = path.clone();
        }
        if let Some(cycles) = self.cycles {
            config.cycles = cycles;
        }
        if let Some(every) = self.report_every {
            config.report_every = every;
        }
        if let Some(networks) = self.networks {
            config.networks = networks;
        }
        if let Some(prefix) = &self.prefix {
            config.weights_prefix = prefix.clone();
        }
        if self.cross_entropy {
            config.error_function = ErrorFunction::CrossEntropy;
        }
        if self.by_item {
            config.update_mode = UpdateMode::ByItem;
        }
        config.penalty |= self.penalty;
        Ok(config)
    }
}

fn training_set(args: &Args, config: &Config) -> Option<TrainingSet> {
    if args.generate {
        return match TrainingSet::from_templates() {
            Ok(set) => Some(set),
            Err(e) => {
                error!("cannot generate training set: {e}");
                None
            }
        };
    }
    match TrainingSet::load_or_generate(&config.training_file, config.in_width, config.out_width) {
        Ok(set) => Some(set),
        Err(e) => {
            error!("{e}");
            None
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return;
        }
    };
    let Some(training) = training_set(&args, &config) else {
        return;
    };
    info!(
        sequences = training.len(),
        patterns = training.pattern_count(),
        "loaded training set"
    );
    if let Some(path) = &args.save_training {
        if let Err(e) = training.save(path) {
            warn!("cannot write {}: {e}", path.display());
        }
    }

    let seed = config.seed.unwrap_or_else(seed_clock);
    info!(seed, "seeding");

    for i in 0..config.networks {
        let rng = WyRng::seeded(seed.wrapping_add(i as u64));
        let mut ctx = match SimulationContext::new(&config, training.clone(), rng) {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("cannot build network: {e}");
                return;
            }
        };

        info!(network = i, cycles = config.cycles, "training");
        ctx.train(&config, |_, _| ControlFlow::Continue(()));
        info!("{}", ctx.report(config.cycles));

        let path = config.weights_path(i);
        match ctx.network.save_weights(&path) {
            Ok(()) => info!("wrote {}", path.display()),
            Err(e) => error!("cannot write {}: {e}", path.display()),
        }

        if args.episode {
            match ctx.run_episode(Task::default(), config.max_episode_steps) {
                Ok(episode) => info!(
                    finished = episode.finished,
                    illegal = episode.illegal_count(),
                    "episode\n{episode}"
                ),
                Err(e) => warn!("cannot run episode: {e}"),
            }
        }
    }
}
