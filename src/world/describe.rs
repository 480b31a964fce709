//! Nearest-neighbour naming of feature vectors, for reports and logs.
//!
//! The network never needs this; it turns a (possibly noisy) fixated or held
//! feature slice back into words by matching it against canonical vectors.

use super::features::{vector_of, Feature, FeatureVector, HELD_OFFSET, HOLDING_NOTHING};
use crate::{constants::ROUTINE_DESCRIBE_THRESHOLD, maths::euclidean_distance};
use std::sync::OnceLock;
use Feature::*;

/// Canonical appearance of every describable object state
const OBJECTS: &[(&str, &[Feature])] = &[
    ("sugar bowl (closed)", &[Cup, TwoHandles, Lid, Closed]),
    ("sugar bowl (open, sugar)", &[Cup, TwoHandles, Open, Sugar]),
    ("sugar bowl (open, empty)", &[Cup, TwoHandles, Open]),
    ("sugar bowl lid", &[Lid]),
    ("cream carton (closed)", &[Carton, Closed]),
    ("cream carton (open)", &[Carton, Open]),
    ("coffee packet (untorn)", &[Packet, Foil, Untorn]),
    ("coffee packet (torn)", &[Packet, Foil, Torn]),
    ("sugar packet (untorn)", &[Packet, Paper, Untorn]),
    ("sugar packet (torn)", &[Packet, Paper, Torn]),
    ("teabag", &[Teabag]),
    ("spoon", &[Spoon]),
    ("spoon (sugar)", &[Spoon, Sugar]),
    ("spoon (clear liquid)", &[Spoon, ClearLiquid]),
    ("spoon (brown liquid)", &[Spoon, BrownLiquid]),
    ("spoon (cream)", &[Spoon, Light]),
];

/// Liquid states a mug can show, combined with cream and visible sugar
const MUG_LIQUIDS: &[(&str, Option<Feature>)] = &[
    ("empty", None),
    ("clear liquid", Some(ClearLiquid)),
    ("brown liquid", Some(BrownLiquid)),
];

fn canonical() -> &'static [(String, FeatureVector)] {
    static TABLE: OnceLock<Vec<(String, FeatureVector)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = Vec::new();
        for (liquid, feature) in MUG_LIQUIDS {
            for light in [false, true] {
                for sugar in [false, true] {
                    let mut on = vec![Cup, OneHandle];
                    on.extend(feature);
                    let mut name = format!("mug ({liquid}");
                    if light {
                        on.push(Light);
                        name.push_str(", cream");
                    }
                    if sugar {
                        on.push(Sugar);
                        name.push_str(", sugar");
                    }
                    name.push(')');
                    table.push((name, vector_of(&on)));
                }
            }
        }
        table.extend(
            OBJECTS
                .iter()
                .map(|(name, on)| (name.to_string(), vector_of(on))),
        );
        table
    })
}

fn nearest(features: &[f64]) -> Option<&'static str> {
    canonical()
        .iter()
        .map(|(name, v)| (name, euclidean_distance(features, v)))
        .filter(|(_, d)| *d < ROUTINE_DESCRIBE_THRESHOLD)
        .min_by(|(_, l), (_, r)| l.total_cmp(r))
        .map(|(name, _)| name.as_str())
}

/// Name the fixated object from the first 18 units of an input vector
pub fn decode_viewed(input: &[f64]) -> Option<&'static str> {
    input.get(..HELD_OFFSET - 2).and_then(nearest)
}

/// Name the held object from the held block of an input vector (units 20-38)
pub fn decode_held(input: &[f64]) -> Option<&'static str> {
    let held = input.get(HELD_OFFSET..=HOLDING_NOTHING)?;
    let (features, nothing) = held.split_at(held.len() - 1);
    let empty_hand = nothing[0] - 1.;
    let empty_features = features.iter().map(|v| v * v).sum::<f64>();
    if (empty_hand * empty_hand + empty_features).sqrt() < ROUTINE_DESCRIBE_THRESHOLD {
        return Some("nothing");
    }
    if nothing[0].abs() >= ROUTINE_DESCRIBE_THRESHOLD {
        return None;
    }
    nearest(features)
}
