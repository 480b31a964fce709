//! The coffee/tea world: a handful of objects, one hand and one point of gaze.
//!
//! A [World] is re-initialised at the start of every episode and then changes
//! only through [World::perform_action]. Illegal actions are an ordinary
//! outcome: they leave the world as it was and report why through
//! [ActionError] and [World::status].

pub mod action;
pub mod contents;
pub mod describe;
pub mod features;
pub mod templates;

pub use action::{decode_action, Action, ActionError};
pub use contents::{transfer_all, transfer_some, Contents, Substance};
pub use features::{Feature, INPUT_WIDTH};
pub use templates::Subtask;

use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectId {
    Mug,
    Spoon,
    SugarBowl,
    Lid,
    Carton,
    CoffeePacket,
    SugarPacket,
    Teabag,
}

impl ObjectId {
    pub const ALL: [ObjectId; 8] = [
        ObjectId::Mug,
        ObjectId::Spoon,
        ObjectId::SugarBowl,
        ObjectId::Lid,
        ObjectId::Carton,
        ObjectId::CoffeePacket,
        ObjectId::SugarPacket,
        ObjectId::Teabag,
    ];

    fn idx(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectId::Mug => "mug",
            ObjectId::Spoon => "spoon",
            ObjectId::SugarBowl => "sugar bowl",
            ObjectId::Lid => "sugar bowl lid",
            ObjectId::Carton => "cream carton",
            ObjectId::CoffeePacket => "coffee packet",
            ObjectId::SugarPacket => "sugar packet",
            ObjectId::Teabag => "teabag",
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape class of an object, selecting which visual features apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Cup,
    SugarBowl,
    Lid,
    Carton,
    FoilPacket,
    PaperPacket,
    Spoon,
    Teabag,
}

impl ObjectKind {
    /// Whether things may be poured, stirred or dipped into this kind of object
    pub fn is_receptacle(self) -> bool {
        matches!(
            self,
            ObjectKind::Cup | ObjectKind::SugarBowl | ObjectKind::Carton
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The object has no notion of being open
    None,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub contents: Contents,
    pub access: Access,
    /// Stirred since something was last added
    pub mixed: bool,
    /// A teabag has been dipped into water here
    pub infused: bool,
    pub present: bool,
}

impl Object {
    fn new(id: ObjectId, kind: ObjectKind, contents: Contents, access: Access) -> Self {
        Self {
            id,
            kind,
            contents,
            access,
            mixed: false,
            infused: false,
            present: true,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.access == Access::Closed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskBase {
    #[default]
    Coffee,
    Tea,
    None,
}

/// Starting conditions of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub base: TaskBase,
    /// Whether the sugar bowl starts with its lid on
    pub sugar_closed: bool,
    pub mug_contents: Contents,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            base: TaskBase::Coffee,
            sugar_closed: true,
            mug_contents: Contents::EMPTY.with(Substance::Water, 4),
        }
    }
}

impl Task {
    pub fn new(base: TaskBase) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct World {
    objects: [Object; 8],
    pub held: Option<ObjectId>,
    pub fixated: Option<ObjectId>,
    pub coffee_instruction: bool,
    pub tea_instruction: bool,
    status: String,
}

impl World {
    pub fn new(task: Task) -> Self {
        let mut world = Self {
            objects: Self::canonical_objects(),
            held: None,
            fixated: None,
            coffee_instruction: false,
            tea_instruction: false,
            status: String::new(),
        };
        world.initialise(task);
        world
    }

    fn canonical_objects() -> [Object; 8] {
        use ObjectId as Id;
        use ObjectKind as Kind;
        let none = Contents::EMPTY;
        [
            Object::new(Id::Mug, Kind::Cup, none, Access::None),
            Object::new(Id::Spoon, Kind::Spoon, none, Access::None),
            Object::new(
                Id::SugarBowl,
                Kind::SugarBowl,
                none.with(Substance::Sugar, 3),
                Access::Closed,
            ),
            Object::new(Id::Lid, Kind::Lid, none, Access::None),
            Object::new(
                Id::Carton,
                Kind::Carton,
                none.with(Substance::Milk, 3),
                Access::Closed,
            ),
            Object::new(
                Id::CoffeePacket,
                Kind::FoilPacket,
                none.with(Substance::Coffee, 1),
                Access::Closed,
            ),
            Object::new(
                Id::SugarPacket,
                Kind::PaperPacket,
                none.with(Substance::Sugar, 1),
                Access::Closed,
            ),
            Object::new(
                Id::Teabag,
                Kind::Teabag,
                none.with(Substance::Tea, 1),
                Access::None,
            ),
        ]
    }

    /// Reset every object and the attention/hand state for a new episode.
    pub fn initialise(&mut self, task: Task) {
        self.objects = Self::canonical_objects();
        self.object_mut(ObjectId::Mug).contents = task.mug_contents;
        self.object_mut(ObjectId::SugarBowl).access = if task.sugar_closed {
            Access::Closed
        } else {
            Access::Open
        };
        // the lid only appears once it has been pulled off the bowl
        self.object_mut(ObjectId::Lid).present = false;

        self.held = None;
        self.fixated = Some(ObjectId::Mug);
        self.coffee_instruction = task.base == TaskBase::Coffee;
        self.tea_instruction = task.base == TaskBase::Tea;
        self.status.clear();
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.idx()]
    }

    pub fn object_mut(&mut self, id: ObjectId) -> &mut Object {
        &mut self.objects[id.idx()]
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Outcome of the last action, for display
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Apply an action. Failure leaves the world unchanged apart from the
    /// instruction flags, which every action clears.
    pub fn perform_action(&mut self, action: Action) -> Result<(), ActionError> {
        let result = self.apply(action);
        self.coffee_instruction = false;
        self.tea_instruction = false;
        self.status = match &result {
            Ok(()) => self.describe_success(action),
            Err(e) => format!("{action} failed: {e}"),
        };
        result
    }

    fn describe_success(&self, action: Action) -> String {
        let name = |id: Option<ObjectId>| id.map_or("nothing", ObjectId::name);
        match action {
            Action::PickUp | Action::PullOff => {
                format!("{action}: holding the {}", name(self.held))
            }
            Action::SayDone => format!("{action}: done"),
            a if a.fixation_target().is_some() => {
                format!("{action}: looking at the {}", name(self.fixated))
            }
            _ => format!(
                "{action}: holding {}, looking at {}",
                name(self.held),
                name(self.fixated)
            ),
        }
    }

    fn held_or(&self, action: Action) -> Result<ObjectId, ActionError> {
        self.held.ok_or(ActionError::NothingHeld(action))
    }

    fn fixated_or(&self, action: Action) -> Result<ObjectId, ActionError> {
        self.fixated.ok_or(ActionError::NothingFixated(action))
    }

    fn hands_free(&self, action: Action) -> Result<(), ActionError> {
        match self.held {
            Some(held) => Err(ActionError::AlreadyHolding { action, held }),
            None => Ok(()),
        }
    }

    fn expect_held(&self, action: Action, expected: ObjectId) -> Result<(), ActionError> {
        let actual = self.held_or(action)?;
        if actual != expected {
            return Err(ActionError::WrongObject {
                action,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// A fixated, uncovered receptacle other than the held object
    fn receptacle(&self, action: Action) -> Result<ObjectId, ActionError> {
        let id = self.fixated_or(action)?;
        let object = self.object(id);
        if self.held == Some(id) {
            return Err(ActionError::SameObject { action, object: id });
        }
        if object.is_closed() {
            return Err(ActionError::Closed(id));
        }
        if !object.kind.is_receptacle() {
            return Err(ActionError::NotReceptacle(id));
        }
        Ok(id)
    }

    fn open_held(&mut self, action: Action, expected: ObjectId) -> Result<(), ActionError> {
        self.expect_held(action, expected)?;
        let object = self.object_mut(expected);
        if !object.is_closed() {
            return Err(ActionError::AlreadyOpen(expected));
        }
        object.access = Access::Open;
        Ok(())
    }

    /// [transfer_some] between two objects, or out of the world when `to` is None
    fn pour_between(&mut self, from: ObjectId, to: Option<ObjectId>) -> bool {
        let mut source = self.object(from).contents;
        let moved = match to {
            Some(to) => {
                let mut target = self.object(to).contents;
                let moved = transfer_some(&mut source, Some(&mut target));
                let to = self.object_mut(to);
                to.contents = target;
                to.mixed = false;
                moved
            }
            None => transfer_some(&mut source, None),
        };
        self.object_mut(from).contents = source;
        moved
    }

    fn apply(&mut self, action: Action) -> Result<(), ActionError> {
        match action {
            Action::PickUp => {
                self.hands_free(action)?;
                self.held = Some(self.fixated_or(action)?);
            }
            Action::PutDown => {
                self.held_or(action)?;
                self.held = None;
            }
            Action::Pour => {
                let held = self.held_or(action)?;
                let source = self.object(held);
                if source.contents.is_empty() {
                    return Err(ActionError::Empty(held));
                }
                if source.is_closed() {
                    return Err(ActionError::Closed(held));
                }
                let target = self.receptacle(action)?;
                self.pour_between(held, Some(target));
            }
            Action::PullOpen => self.open_held(action, ObjectId::CoffeePacket)?,
            Action::TearOpen => self.open_held(action, ObjectId::SugarPacket)?,
            Action::PeelOpen => self.open_held(action, ObjectId::Carton)?,
            Action::PullOff => {
                self.hands_free(action)?;
                let fixated = self.fixated_or(action)?;
                if fixated != ObjectId::SugarBowl {
                    return Err(ActionError::WrongObject {
                        action,
                        expected: ObjectId::SugarBowl,
                        actual: fixated,
                    });
                }
                if !self.object(fixated).is_closed() {
                    return Err(ActionError::AlreadyOpen(fixated));
                }
                self.object_mut(fixated).access = Access::Open;
                self.object_mut(ObjectId::Lid).present = true;
                self.held = Some(ObjectId::Lid);
            }
            Action::Scoop => {
                self.expect_held(action, ObjectId::Spoon)?;
                if !self.object(ObjectId::Spoon).contents.is_empty() {
                    return Err(ActionError::NotEmpty(ObjectId::Spoon));
                }
                let source = self.receptacle(action)?;
                if self.object(source).contents.is_empty() {
                    return Err(ActionError::Empty(source));
                }
                self.pour_between(source, Some(ObjectId::Spoon));
            }
            Action::Sip => {
                let held = self.held_or(action)?;
                let object = self.object(held);
                if object.is_closed() {
                    return Err(ActionError::Closed(held));
                }
                if object.contents.is_empty() {
                    return Err(ActionError::Empty(held));
                }
                self.pour_between(held, None);
            }
            Action::Stir => {
                self.expect_held(action, ObjectId::Spoon)?;
                let target = self.receptacle(action)?;
                if self.object(target).contents.is_empty() {
                    return Err(ActionError::Empty(target));
                }
                let mut spoon = self.object(ObjectId::Spoon).contents;
                let mut into = self.object(target).contents;
                transfer_all(&mut spoon, Some(&mut into));
                self.object_mut(ObjectId::Spoon).contents = spoon;
                let target = self.object_mut(target);
                target.contents = into;
                target.mixed = true;
            }
            Action::Dip => {
                self.expect_held(action, ObjectId::Teabag)?;
                let target = self.receptacle(action)?;
                let target = self.object_mut(target);
                if target.contents.has_water() {
                    target.infused = true;
                }
            }
            Action::SayDone => {}
            fixate => {
                if let Some(id) = fixate.fixation_target() {
                    if !self.object(id).present {
                        return Err(ActionError::NotPresent(id));
                    }
                    self.fixated = Some(id);
                }
            }
        }
        Ok(())
    }
}
