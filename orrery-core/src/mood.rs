//! Mood color derivation.
//!
//! Projects the affect state onto four mood buckets and blends their anchor
//! colors weighted by positive deviation from baseline. Trust is the one
//! inverse contributor: deviation BELOW baseline feeds the purple (anxiety)
//! bucket.

use crate::types::{AffectState, MoodColor, TraitConfigMap};

const RED_TRAITS: &[&str] = &[
    "aggression",
    "grudge",
    "antagonism",
    "domineering",
    "stubbornness",
    "pride",
    "urgency",
    "tension",
];

const BLUE_TRAITS: &[&str] = &[
    "sadness",
    "fatigue",
    "introversion",
    "rumination",
    "guilt",
    "confusion",
    "moral_violation",
];

const YELLOW_TRAITS: &[&str] = &[
    "humor",
    "energy",
    "openness",
    "hope",
    "confidence",
    "ambition",
    "proactivity",
    "decisiveness",
    "empathy",
];

const PURPLE_TRAITS: &[&str] = &["fear", "paranoia", "skepticism", "self_interest", "analytical"];

const RED_ANCHOR: (f64, f64, f64) = (255.0, 69.0, 58.0);
const BLUE_ANCHOR: (f64, f64, f64) = (10.0, 132.0, 255.0);
const YELLOW_ANCHOR: (f64, f64, f64) = (255.0, 214.0, 10.0);
const PURPLE_ANCHOR: (f64, f64, f64) = (191.0, 90.0, 242.0);

fn bucket_deviation(state: &AffectState, config: &TraitConfigMap, traits: &[&str]) -> f64 {
    traits
        .iter()
        .filter_map(|name| {
            let value = state.get(*name)?;
            let cfg = config.get(*name)?;
            Some((value - cfg.baseline).max(0.0))
        })
        .sum()
}

/// Compute the RGBA mood color for the current state.
///
/// Total deviation below 0.1 yields [`MoodColor::NEUTRAL`].
#[must_use]
pub fn mood_color(state: &AffectState, config: &TraitConfigMap) -> MoodColor {
    let red = bucket_deviation(state, config, RED_TRAITS);
    let blue = bucket_deviation(state, config, BLUE_TRAITS);
    let yellow = bucket_deviation(state, config, YELLOW_TRAITS);
    let mut purple = bucket_deviation(state, config, PURPLE_TRAITS);

    // Broken trust reads as anxiety.
    if let (Some(value), Some(cfg)) = (state.get("trust"), config.get("trust")) {
        purple += (cfg.baseline - value).max(0.0);
    }

    let total = red + blue + yellow + purple;
    if total < 0.1 {
        return MoodColor::NEUTRAL;
    }

    let weights = [
        (red / total, RED_ANCHOR),
        (blue / total, BLUE_ANCHOR),
        (yellow / total, YELLOW_ANCHOR),
        (purple / total, PURPLE_ANCHOR),
    ];
    let r: f64 = weights.iter().map(|(w, a)| w * a.0).sum();
    let g: f64 = weights.iter().map(|(w, a)| w * a.1).sum();
    let b: f64 = weights.iter().map(|(w, a)| w * a.2).sum();
    let alpha = (total * 0.5).min(0.7);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    MoodColor {
        r: r as u8,
        g: g as u8,
        b: b as u8,
        alpha: (alpha * 100.0).round() / 100.0,
    }
}
