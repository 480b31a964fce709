//! Correct action sequences for each subtask, and the training sets built by
//! replaying them through the world.

use super::{Action, ActionError, Task, TaskBase, World, INPUT_WIDTH};
use crate::{
    error::TrainingDataError,
    training::{Pattern, Sequence, TrainingSet},
};
use core::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::warn;
use Action::*;

pub const ACTIONS_ADD_COFFEE: &[Action] = &[
    FixateCoffeePacket,
    PickUp,
    PullOpen,
    FixateCup,
    Pour,
    FixateSpoon,
    PutDown,
    PickUp,
    FixateCup,
    Stir,
    PutDown,
];

pub const ACTIONS_ADD_TEA: &[Action] = &[FixateTeabag, PickUp, FixateCup, Dip, PutDown];

pub const ACTIONS_ADD_SUGAR_FROM_PACKET: &[Action] = &[
    FixateSugarPacket,
    PickUp,
    TearOpen,
    FixateCup,
    Pour,
    FixateSpoon,
    PutDown,
    PickUp,
    FixateCup,
    Stir,
    PutDown,
];

pub const ACTIONS_ADD_SUGAR_FROM_BOWL: &[Action] = &[
    FixateSugarBowl,
    PullOff,
    PutDown,
    FixateSpoon,
    PickUp,
    FixateSugarBowl,
    Scoop,
    FixateCup,
    Stir,
    PutDown,
];

/// Sugar from a bowl whose lid is already off
pub const ACTIONS_ADD_SUGAR_FROM_OPEN_BOWL: &[Action] = &[
    FixateSpoon,
    PickUp,
    FixateSugarBowl,
    Scoop,
    FixateCup,
    Stir,
    PutDown,
];

pub const ACTIONS_ADD_CREAM: &[Action] = &[
    FixateCarton,
    PickUp,
    PeelOpen,
    FixateCup,
    Pour,
    FixateSpoon,
    PutDown,
    PickUp,
    FixateCup,
    Stir,
    PutDown,
];

pub const ACTIONS_DRINK: &[Action] = &[FixateCup, PickUp, Sip, Sip, PutDown];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subtask {
    Coffee,
    Tea,
    SugarFromPacket,
    SugarFromBowl,
    Cream,
    Drink,
}

impl Subtask {
    pub fn actions(self, sugar_closed: bool) -> &'static [Action] {
        match self {
            Subtask::Coffee => ACTIONS_ADD_COFFEE,
            Subtask::Tea => ACTIONS_ADD_TEA,
            Subtask::SugarFromPacket => ACTIONS_ADD_SUGAR_FROM_PACKET,
            Subtask::SugarFromBowl if sugar_closed => ACTIONS_ADD_SUGAR_FROM_BOWL,
            Subtask::SugarFromBowl => ACTIONS_ADD_SUGAR_FROM_OPEN_BOWL,
            Subtask::Cream => ACTIONS_ADD_CREAM,
            Subtask::Drink => ACTIONS_DRINK,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Subtask::Coffee => "coffee",
            Subtask::Tea => "tea",
            Subtask::SugarFromPacket => "sugar-packet",
            Subtask::SugarFromBowl => "sugar-bowl",
            Subtask::Cream => "cream",
            Subtask::Drink => "drink",
        }
    }
}

impl fmt::Display for Subtask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("template step {step} ({action}) is illegal: {source}")]
pub struct TemplateError {
    pub step: usize,
    pub action: Action,
    #[source]
    pub source: ActionError,
}

/// The full action list for a task made of `subtasks`, ending with SAY_DONE
pub fn task_actions(task: &Task, subtasks: &[Subtask]) -> Vec<Action> {
    let mut actions: Vec<Action> = subtasks
        .iter()
        .flat_map(|s| s.actions(task.sugar_closed).iter().copied())
        .collect();
    actions.push(SayDone);
    actions
}

/// Replay a task through a fresh world, recording the encoded world state
/// before each action as input and the action itself as target.
pub fn generate_sequence(task: &Task, subtasks: &[Subtask]) -> Result<Sequence, TemplateError> {
    let base = match task.base {
        TaskBase::Coffee => "coffee",
        TaskBase::Tea => "tea",
        TaskBase::None => "none",
    };
    let names: Vec<&str> = subtasks.iter().map(|s| s.name()).collect();
    let mut sequence = Sequence::new(format!("{base}: {}", names.join(" ")));

    let mut world = World::new(*task);
    let mut input = vec![0.; INPUT_WIDTH];
    for (step, action) in task_actions(task, subtasks).into_iter().enumerate() {
        world.encode(&mut input);
        sequence.push(Pattern::new(input.clone(), action.one_hot()));
        world
            .perform_action(action)
            .map_err(|source| TemplateError {
                step,
                action,
                source,
            })?;
    }
    Ok(sequence)
}

/// Coffee with both sugar sources and both orderings of sugar and cream,
/// plus tea with both sugar sources.
pub fn standard_tasks() -> Vec<(Task, Vec<Subtask>)> {
    use Subtask::*;
    let coffee = Task::new(TaskBase::Coffee);
    let tea = Task::new(TaskBase::Tea);
    vec![
        (coffee, vec![Coffee, SugarFromPacket, Cream, Drink]),
        (coffee, vec![Coffee, SugarFromBowl, Cream, Drink]),
        (coffee, vec![Coffee, Cream, SugarFromPacket, Drink]),
        (coffee, vec![Coffee, Cream, SugarFromBowl, Drink]),
        (tea, vec![Tea, SugarFromPacket, Drink]),
        (tea, vec![Tea, SugarFromBowl, Drink]),
    ]
}

impl TrainingSet {
    /// Training set of the replayed [standard_tasks]
    pub fn from_templates() -> Result<TrainingSet, TemplateError> {
        let mut set = TrainingSet::new(INPUT_WIDTH, Action::COUNT);
        for (task, subtasks) in standard_tasks() {
            // widths are fixed by construction
            set.sequences.push(generate_sequence(&task, &subtasks)?);
        }
        Ok(set)
    }

    /// Load the sequences in `path`, or replay the [standard_tasks] when there
    /// is no file there.
    pub fn load_or_generate<P: AsRef<Path>>(
        path: P,
        in_width: usize,
        out_width: usize,
    ) -> Result<TrainingSet, TrainingDataError> {
        let path = path.as_ref();
        if path.exists() {
            return TrainingSet::load(path, in_width, out_width);
        }
        warn!("no training data at {}, using the task templates", path.display());
        Ok(TrainingSet::from_templates()?)
    }
}
