//! Rendering of world objects into the binary visual features the network sees.

use super::{Access, Object, ObjectKind, World};
use crate::constants::ROUTINE_FEATURE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Cup,
    OneHandle,
    TwoHandles,
    Lid,
    ClearLiquid,
    Light,
    BrownLiquid,
    Carton,
    Open,
    Closed,
    Packet,
    Foil,
    Paper,
    Torn,
    Untorn,
    Spoon,
    Teabag,
    Sugar,
}

/// Unit of the coffee instruction, following the fixated object's features
pub const COFFEE_INSTRUCTION: usize = ROUTINE_FEATURE_COUNT;
/// Unit of the tea instruction
pub const TEA_INSTRUCTION: usize = ROUTINE_FEATURE_COUNT + 1;
/// First unit of the held object's features
pub const HELD_OFFSET: usize = ROUTINE_FEATURE_COUNT + 2;
/// Unit that is on when nothing is held
pub const HOLDING_NOTHING: usize = HELD_OFFSET + ROUTINE_FEATURE_COUNT;
/// Width of the encoded world state
pub const INPUT_WIDTH: usize = HOLDING_NOTHING + 1;

pub type FeatureVector = [f64; ROUTINE_FEATURE_COUNT];

pub fn vector_of(features: &[Feature]) -> FeatureVector {
    let mut v = [0.; ROUTINE_FEATURE_COUNT];
    for f in features {
        v[*f as usize] = 1.;
    }
    v
}

/// The features an object currently shows
pub fn features(object: &Object) -> FeatureVector {
    let mut on = Vec::with_capacity(6);
    match object.kind {
        ObjectKind::Cup => on.extend([Feature::Cup, Feature::OneHandle]),
        ObjectKind::SugarBowl => {
            on.extend([Feature::Cup, Feature::TwoHandles]);
            if object.access == Access::Closed {
                on.push(Feature::Lid);
            }
        }
        ObjectKind::Lid => on.push(Feature::Lid),
        ObjectKind::Carton => on.push(Feature::Carton),
        ObjectKind::FoilPacket => on.extend([Feature::Packet, Feature::Foil]),
        ObjectKind::PaperPacket => on.extend([Feature::Packet, Feature::Paper]),
        ObjectKind::Spoon => on.push(Feature::Spoon),
        ObjectKind::Teabag => on.push(Feature::Teabag),
    }

    match (object.kind, object.access) {
        (ObjectKind::Carton | ObjectKind::SugarBowl, Access::Open) => on.push(Feature::Open),
        (ObjectKind::Carton | ObjectKind::SugarBowl, Access::Closed) => on.push(Feature::Closed),
        (ObjectKind::FoilPacket | ObjectKind::PaperPacket, Access::Open) => on.push(Feature::Torn),
        (ObjectKind::FoilPacket | ObjectKind::PaperPacket, Access::Closed) => {
            on.push(Feature::Untorn)
        }
        _ => {}
    }

    let shows_contents = matches!(
        object.kind,
        ObjectKind::Cup | ObjectKind::SugarBowl | ObjectKind::Spoon
    ) && object.access != Access::Closed;
    if shows_contents {
        let c = object.contents;
        if c.has_coffee() || (c.has_water() && (object.infused || c.has_tea())) {
            on.push(Feature::BrownLiquid);
        } else if c.has_water() {
            on.push(Feature::ClearLiquid);
        }
        if c.has_milk() {
            on.push(Feature::Light);
        }
        if c.has_sugar() && !object.mixed {
            on.push(Feature::Sugar);
        }
    }

    vector_of(&on)
}

impl World {
    /// Write the network input for the current state into `buffer`, which
    /// must be at least [INPUT_WIDTH] wide.
    pub fn encode(&self, buffer: &mut [f64]) {
        let buffer = &mut buffer[..INPUT_WIDTH];
        buffer.fill(0.);

        if let Some(id) = self.fixated {
            buffer[..ROUTINE_FEATURE_COUNT].copy_from_slice(&features(self.object(id)));
        }
        buffer[COFFEE_INSTRUCTION] = if self.coffee_instruction { 1. } else { 0. };
        buffer[TEA_INSTRUCTION] = if self.tea_instruction { 1. } else { 0. };

        match self.held {
            Some(id) => buffer[HELD_OFFSET..HOLDING_NOTHING]
                .copy_from_slice(&features(self.object(id))),
            None => buffer[HOLDING_NOTHING] = 1.,
        }
    }

    pub fn input_vector(&self) -> Vec<f64> {
        let mut v = vec![0.; INPUT_WIDTH];
        self.encode(&mut v);
        v
    }
}
