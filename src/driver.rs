//! Training cycles, periodic scoring and closed-loop episodes over a
//! [SimulationContext].

use crate::{
    config::Config,
    context::SimulationContext,
    error::NetworkError,
    network::{ErrorFunction, Network, WeightMatrix},
    random::WyRng,
    training::TrainingSet,
    world::{decode_action, Action, ActionError, Task, INPUT_WIDTH},
};
use core::{fmt, ops::ControlFlow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// When accumulated weight changes are applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Once per cycle, after every sequence in training order
    #[default]
    ByEpoch,
    /// After each sequence, with the sequence order shuffled every cycle
    ByItem,
}

/// Error metrics after some number of training cycles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub cycle: usize,
    pub rms: f64,
    pub cross_entropy: f64,
    pub soft_max: f64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle {:>6}: rms {:.6} cross-entropy {:.6} soft-max {:.6}",
            self.cycle, self.rms, self.cross_entropy, self.soft_max
        )
    }
}

/// One closed-loop run of the network in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub steps: Vec<(Action, Result<(), ActionError>)>,
    /// Whether the episode ended with SAY_DONE rather than the step cap
    pub finished: bool,
}

impl Episode {
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.steps.iter().map(|(a, _)| *a)
    }

    pub fn illegal_count(&self) -> usize {
        self.steps.iter().filter(|(_, r)| r.is_err()).count()
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (action, result)) in self.steps.iter().enumerate() {
            match result {
                Ok(()) => writeln!(f, "{i:>3} {action}")?,
                Err(e) => writeln!(f, "{i:>3} {action} (illegal: {e})")?,
            }
        }
        Ok(())
    }
}

/// Mean error of `network` over `set` under each metric. Every metric sees the
/// same starting hidden states, drawn from a copy of `rng`. Scoring runs on a
/// copy of the network, so its activations are left as they were.
pub fn score(network: &Network, set: &TrainingSet, rng: &WyRng, cycle: usize) -> Report {
    let mut scratch = network.clone();
    let mut measure = |metric| scratch.test(set, &mut rng.clone(), metric);
    Report {
        cycle,
        rms: measure(ErrorFunction::SumSquare).sqrt(),
        cross_entropy: measure(ErrorFunction::CrossEntropy),
        soft_max: measure(ErrorFunction::SoftMax),
    }
}

impl SimulationContext {
    /// One pass over the training set, each sequence starting from a random
    /// hidden state.
    pub fn train_epoch(&mut self, config: &Config) {
        let Self {
            network,
            rng,
            training,
            ..
        } = self;
        let (error_fn, penalty) = (config.error_function, config.penalty);
        network.clear_deltas();
        match config.update_mode {
            UpdateMode::ByEpoch => {
                for sequence in training.iter() {
                    network.randomize_hidden(rng);
                    network.calculate_weight_changes(sequence, error_fn, penalty);
                }
                network.adjust_weights(config.learning_rate);
                network.clear_deltas();
            }
            UpdateMode::ByItem => {
                training.shuffle(rng);
                for sequence in training.iter() {
                    network.randomize_hidden(rng);
                    network.calculate_weight_changes(sequence, error_fn, penalty);
                    network.adjust_weights(config.learning_rate);
                    network.clear_deltas();
                }
            }
        }
    }

    /// Score the network without touching its state or the training random
    /// stream
    pub fn report(&self, cycle: usize) -> Report {
        score(&self.network, &self.training, &self.rng, cycle)
    }

    /// Run up to `config.cycles` training cycles, logging a [Report] every
    /// `config.report_every` cycles. `hook` is consulted after every cycle with
    /// that cycle's report, if one was made, and may stop the run early.
    /// Returns the number of cycles completed.
    pub fn train<F>(&mut self, config: &Config, mut hook: F) -> usize
    where
        F: FnMut(usize, Option<&Report>) -> ControlFlow<()>,
    {
        if self.training.is_empty() {
            warn!("training set is empty, nothing to learn");
        }
        for cycle in 1..=config.cycles {
            self.train_epoch(config);

            let report = (config.report_every > 0 && cycle % config.report_every == 0)
                .then(|| self.report(cycle));
            if let Some(r) = &report {
                info!(
                    cycle,
                    rms = r.rms,
                    cross_entropy = r.cross_entropy,
                    soft_max = r.soft_max,
                    "training"
                );
            }
            if hook(cycle, report.as_ref()).is_break() {
                info!(cycle, "training stopped early");
                return cycle;
            }
        }
        config.cycles
    }

    /// Let the network act in a freshly initialised world until it says it is
    /// done or `max_steps` actions have been taken. Illegal actions are
    /// recorded and the episode carries on.
    pub fn run_episode(&mut self, task: Task, max_steps: usize) -> Result<Episode, NetworkError> {
        self.episode(task, max_steps, None)
    }

    /// As [SimulationContext::run_episode], adding `normal(0, sqrt(variance))`
    /// noise to the hidden units before every step.
    pub fn run_noisy_episode(
        &mut self,
        task: Task,
        max_steps: usize,
        variance: f64,
    ) -> Result<Episode, NetworkError> {
        self.episode(task, max_steps, Some(variance))
    }

    fn episode(
        &mut self,
        task: Task,
        max_steps: usize,
        noise: Option<f64>,
    ) -> Result<Episode, NetworkError> {
        let (in_width, _, out_width) = self.network.dimensions();
        if in_width != INPUT_WIDTH {
            return Err(NetworkError::WidthMismatch {
                what: "world encoding",
                expected: in_width,
                actual: INPUT_WIDTH,
            });
        }
        if out_width != Action::COUNT {
            return Err(NetworkError::WidthMismatch {
                what: "action set",
                expected: out_width,
                actual: Action::COUNT,
            });
        }

        self.world.initialise(task);
        self.network.randomize_hidden(&mut self.rng);
        let mut input = vec![0.; INPUT_WIDTH];
        let mut episode = Episode {
            steps: Vec::new(),
            finished: false,
        };

        for _ in 0..max_steps {
            if let Some(variance) = noise {
                self.network.inject_noise(variance, &mut self.rng);
            }
            self.world.encode(&mut input);
            self.network.propagate2(&input);
            let Some(action) = decode_action(self.network.output()) else {
                warn!("network output decodes to no action");
                break;
            };
            let result = self.world.perform_action(action);
            debug!(status = self.world.status(), "step");
            episode.steps.push((action, result));
            if action == Action::SayDone {
                episode.finished = true;
                break;
            }
        }
        if !episode.finished {
            debug!(max_steps, "episode hit the step cap");
        }
        Ok(episode)
    }
}

/// Lesion copies of `network` at each severity and score them. Each copy draws
/// from its own stream, seeded from `seed` and its position in `severities`.
/// Returns `(severity, rms error)` pairs in order.
pub fn lesion_sweep(
    network: &Network,
    set: &TrainingSet,
    which: WeightMatrix,
    severities: &[f64],
    seed: u64,
) -> Result<Vec<(f64, f64)>, NetworkError> {
    let lesioned = |(i, &severity): (usize, &f64)| -> Result<(f64, f64), NetworkError> {
        let mut rng = WyRng::seeded(seed.wrapping_add(i as u64));
        let mut copy = network.clone();
        copy.lesion_weights(which, severity, &mut rng)?;
        let report = score(&copy, set, &rng, 0);
        Ok((severity, report.rms))
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        severities.par_iter().enumerate().map(lesioned).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        severities.iter().enumerate().map(lesioned).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        training::{Pattern, Sequence},
        world::TaskBase,
    };

    fn small_config() -> Config {
        Config {
            in_width: 3,
            hidden_width: 4,
            out_width: 2,
            learning_rate: 0.5,
            report_every: 0,
            ..Config::default()
        }
    }

    fn small_set() -> TrainingSet {
        let mut set = TrainingSet::new(3, 2);
        for (label, first) in [("a", [1., 0., 0.]), ("b", [0., 1., 0.]), ("c", [0., 0., 1.])] {
            let mut seq = Sequence::new(label);
            seq.push(Pattern::new(first.to_vec(), vec![1., 0.]));
            seq.push(Pattern::new(vec![0., 0., 0.], vec![0., 1.]));
            seq.push(Pattern::new(first.to_vec(), vec![first[0], first[1]]));
            set.push(seq).unwrap();
        }
        set
    }

    fn small_context(seed: u64) -> SimulationContext {
        SimulationContext::new(&small_config(), small_set(), WyRng::seeded(seed)).unwrap()
    }

    #[test]
    fn test_epoch_count_determinism() {
        let config = small_config();
        let run = |epochs: &[usize]| {
            let mut ctx = small_context(31);
            for &n in epochs {
                let cfg = Config {
                    cycles: n,
                    ..config.clone()
                };
                ctx.train(&cfg, |_, _| ControlFlow::Continue(()));
            }
            ctx.network
        };
        assert_eq!(run(&[7, 5]), run(&[12]));
        assert_ne!(run(&[7]), run(&[12]));
    }

    #[test]
    fn test_reports_do_not_disturb_training() {
        let quiet = Config {
            cycles: 10,
            ..small_config()
        };
        let chatty = Config {
            report_every: 2,
            ..quiet.clone()
        };
        let mut a = small_context(4);
        let mut b = small_context(4);
        a.train(&quiet, |_, _| ControlFlow::Continue(()));
        let mut reports = Vec::new();
        b.train(&chatty, |_, r| {
            reports.extend(r.copied());
            ControlFlow::Continue(())
        });
        assert_eq!(a.network, b.network);
        assert_eq!(reports.len(), 5);
        assert_eq!(reports[4].cycle, 10);
        assert_eq!(reports[0].soft_max, 0.);
    }

    #[test]
    fn test_report_leaves_network_untouched() {
        let config = Config {
            cycles: 5,
            ..small_config()
        };
        let mut ctx = small_context(12);
        ctx.train(&config, |_, _| ControlFlow::Continue(()));
        let before = ctx.network.clone();
        let first = ctx.report(1);
        assert_eq!(ctx.network, before);
        assert_eq!(ctx.network.hidden(), before.hidden());
        assert_eq!(ctx.report(1), first);
    }

    #[test]
    fn test_hook_stops_training() {
        let config = Config {
            cycles: 100,
            ..small_config()
        };
        let mut ctx = small_context(5);
        let done = ctx.train(&config, |cycle, _| {
            if cycle == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(done, 3);
    }

    #[test]
    fn test_training_lowers_error() {
        for mode in [UpdateMode::ByEpoch, UpdateMode::ByItem] {
            let config = Config {
                cycles: 400,
                update_mode: mode,
                ..small_config()
            };
            let mut ctx = small_context(6);
            let before = ctx.report(0);
            ctx.train(&config, |_, _| ControlFlow::Continue(()));
            let after = ctx.report(config.cycles);
            assert!(after.rms < before.rms, "{mode:?}: {after} vs {before}");
        }
    }

    #[test]
    fn test_by_item_keeps_patterns_in_order() {
        let config = Config {
            cycles: 3,
            update_mode: UpdateMode::ByItem,
            ..small_config()
        };
        let mut ctx = small_context(7);
        ctx.train(&config, |_, _| ControlFlow::Continue(()));
        let mut labels: Vec<&str> = ctx.training.iter().map(|s| s.label.as_str()).collect();
        labels.sort();
        assert_eq!(labels, ["a", "b", "c"]);
        for seq in ctx.training.iter() {
            assert_eq!(seq.patterns[1].input, vec![0., 0., 0.]);
        }
    }

    #[test]
    fn test_episode_untrained() {
        let config = Config::default();
        let set = TrainingSet::new(INPUT_WIDTH, Action::COUNT);
        let mut ctx = SimulationContext::new(&config, set, WyRng::seeded(8)).unwrap();
        let episode = ctx.run_episode(Task::default(), 25).unwrap();
        assert!(!episode.steps.is_empty());
        assert!(episode.steps.len() <= 25);
        assert_eq!(episode.finished, episode.actions().last() == Some(Action::SayDone));
        assert!(episode.illegal_count() <= episode.steps.len());
    }

    #[test]
    fn test_episode_replays_with_seed() {
        let config = Config::default();
        let set = TrainingSet::new(INPUT_WIDTH, Action::COUNT);
        let mut a = SimulationContext::new(&config, set.clone(), WyRng::seeded(9)).unwrap();
        let mut b = SimulationContext::new(&config, set, WyRng::seeded(9)).unwrap();
        let task = Task::new(TaskBase::Tea);
        assert_eq!(
            a.run_noisy_episode(task, 30, 0.05).unwrap(),
            b.run_noisy_episode(task, 30, 0.05).unwrap()
        );
    }

    #[test]
    fn test_episode_width_mismatch() {
        let mut ctx = small_context(10);
        assert!(matches!(
            ctx.run_episode(Task::default(), 10),
            Err(NetworkError::WidthMismatch { what: "world encoding", .. })
        ));
    }

    #[test]
    fn test_lesion_sweep() {
        let mut ctx = small_context(13);
        let config = Config {
            cycles: 200,
            ..small_config()
        };
        ctx.train(&config, |_, _| ControlFlow::Continue(()));
        let sweep = |severities: &[f64]| {
            lesion_sweep(
                &ctx.network,
                &ctx.training,
                WeightMatrix::HiddenOutput,
                severities,
                1,
            )
        };
        let severities = [0., 0.5, 1.];
        let scores = sweep(&severities).unwrap();
        assert_eq!(scores.iter().map(|(s, _)| *s).collect::<Vec<_>>(), severities);
        // every output weight gone leaves every output at 0.5
        assert!((scores[2].1 - 0.5).abs() < 1e-12);
        assert!(scores[0].1 < scores[2].1);
        assert_eq!(sweep(&severities).unwrap(), scores);
        assert!(sweep(&[2.]).is_err());
    }
}
