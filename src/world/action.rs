use super::ObjectId;
use core::fmt;
use thiserror::Error;

/// The 19 discrete actions, in output-unit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    PickUp,
    PutDown,
    Pour,
    PeelOpen,
    TearOpen,
    PullOpen,
    PullOff,
    Scoop,
    Sip,
    Stir,
    Dip,
    SayDone,
    FixateCup,
    FixateTeabag,
    FixateCoffeePacket,
    FixateSpoon,
    FixateCarton,
    FixateSugarPacket,
    FixateSugarBowl,
}

impl Action {
    pub const COUNT: usize = 19;

    pub const ALL: [Action; Action::COUNT] = [
        Action::PickUp,
        Action::PutDown,
        Action::Pour,
        Action::PeelOpen,
        Action::TearOpen,
        Action::PullOpen,
        Action::PullOff,
        Action::Scoop,
        Action::Sip,
        Action::Stir,
        Action::Dip,
        Action::SayDone,
        Action::FixateCup,
        Action::FixateTeabag,
        Action::FixateCoffeePacket,
        Action::FixateSpoon,
        Action::FixateCarton,
        Action::FixateSugarPacket,
        Action::FixateSugarBowl,
    ];

    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn from_idx(idx: usize) -> Option<Action> {
        Self::ALL.get(idx).copied()
    }

    /// Target vector for this action: 1 at its unit, 0 elsewhere
    pub fn one_hot(self) -> Vec<f64> {
        let mut v = vec![0.; Self::COUNT];
        v[self.idx()] = 1.;
        v
    }

    /// The object a fixate action looks at
    pub fn fixation_target(self) -> Option<ObjectId> {
        match self {
            Action::FixateCup => Some(ObjectId::Mug),
            Action::FixateTeabag => Some(ObjectId::Teabag),
            Action::FixateCoffeePacket => Some(ObjectId::CoffeePacket),
            Action::FixateSpoon => Some(ObjectId::Spoon),
            Action::FixateCarton => Some(ObjectId::Carton),
            Action::FixateSugarPacket => Some(ObjectId::SugarPacket),
            Action::FixateSugarBowl => Some(ObjectId::SugarBowl),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::PickUp => "PICK_UP",
            Action::PutDown => "PUT_DOWN",
            Action::Pour => "POUR",
            Action::PeelOpen => "PEEL_OPEN",
            Action::TearOpen => "TEAR_OPEN",
            Action::PullOpen => "PULL_OPEN",
            Action::PullOff => "PULL_OFF",
            Action::Scoop => "SCOOP",
            Action::Sip => "SIP",
            Action::Stir => "STIR",
            Action::Dip => "DIP",
            Action::SayDone => "SAY_DONE",
            Action::FixateCup => "FIXATE_CUP",
            Action::FixateTeabag => "FIXATE_TEABAG",
            Action::FixateCoffeePacket => "FIXATE_COFFEE_PACKET",
            Action::FixateSpoon => "FIXATE_SPOON",
            Action::FixateCarton => "FIXATE_CARTON",
            Action::FixateSugarPacket => "FIXATE_SUGAR_PACKET",
            Action::FixateSugarBowl => "FIXATE_SUGAR_BOWL",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arg-max over an output vector. Ties go to the lowest index; `None` only
/// for an empty vector.
pub fn decode_action(output: &[f64]) -> Option<Action> {
    let mut best = 0;
    for (i, v) in output.iter().enumerate().take(Action::COUNT) {
        if *v > output[best] {
            best = i;
        }
    }
    if output.is_empty() {
        None
    } else {
        Action::from_idx(best)
    }
}

/// Why an action could not be carried out in the current world state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{0} requires something to be held")]
    NothingHeld(Action),
    #[error("{action} requires empty hands, but the {held} is held")]
    AlreadyHolding { action: Action, held: ObjectId },
    #[error("{0} requires something to be fixated")]
    NothingFixated(Action),
    #[error("the {0} is not present")]
    NotPresent(ObjectId),
    #[error("{action} acts on the {expected}, not the {actual}")]
    WrongObject {
        action: Action,
        expected: ObjectId,
        actual: ObjectId,
    },
    #[error("the {0} is empty")]
    Empty(ObjectId),
    #[error("the {0} is closed")]
    Closed(ObjectId),
    #[error("the {0} is already open")]
    AlreadyOpen(ObjectId),
    #[error("the {0} cannot receive anything")]
    NotReceptacle(ObjectId),
    #[error("the {0} already holds something")]
    NotEmpty(ObjectId),
    #[error("cannot {action} the {object} into itself")]
    SameObject { action: Action, object: ObjectId },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_indices_match_order() {
        for (i, a) in Action::ALL.iter().enumerate() {
            assert_eq!(a.idx(), i);
            assert_eq!(Action::from_idx(i), Some(*a));
        }
        assert_eq!(Action::from_idx(Action::COUNT), None);
    }

    #[test]
    fn test_decode_argmax() {
        let mut out = vec![0.1; Action::COUNT];
        out[Action::Stir.idx()] = 0.9;
        assert_eq!(decode_action(&out), Some(Action::Stir));
        assert_eq!(decode_action(&Action::Dip.one_hot()), Some(Action::Dip));
    }

    #[test]
    fn test_decode_ties_go_to_first() {
        let mut out = vec![0.; Action::COUNT];
        out[3] = 0.7;
        out[8] = 0.7;
        assert_eq!(decode_action(&out), Some(Action::PeelOpen));
        assert_eq!(decode_action(&[0.5; Action::COUNT]), Some(Action::PickUp));
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode_action(&[]), None);
    }
}
