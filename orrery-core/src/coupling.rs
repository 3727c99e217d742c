//! Trait coupling rules.
//!
//! Each rule reads a pre-tick snapshot of the affect state and accumulates
//! signed influences into a scratch map. All rules see the same snapshot, so
//! evaluation order never changes the outcome; the engine folds the
//! accumulated influences in before homeostatic restoration.

use std::collections::BTreeMap;

use crate::types::AffectState;

/// Accumulated per-trait influences for one tick.
pub type InfluenceMap = BTreeMap<String, f64>;

/// Evaluate every coupling rule against `snapshot` and return the combined
/// influences, scaled by `dt` seconds.
#[must_use]
pub fn evaluate(snapshot: &AffectState, dt: f64) -> InfluenceMap {
    let mut influences = InfluenceMap::new();
    distrust_feeds_grudge(snapshot, dt, &mut influences);
    drive_synergy(snapshot, dt, &mut influences);
    exhaustion_bleed(snapshot, dt, &mut influences);
    ego_loop(snapshot, dt, &mut influences);
    agitation_spiral(snapshot, dt, &mut influences);
    analysis_paralysis(snapshot, dt, &mut influences);
    momentum(snapshot, dt, &mut influences);
    isolation_drift(snapshot, dt, &mut influences);
    influences
}

fn get(snapshot: &AffectState, name: &str) -> Option<f64> {
    snapshot.get(name).copied()
}

fn add(influences: &mut InfluenceMap, name: &str, amount: f64) {
    *influences.entry(name.to_string()).or_insert(0.0) += amount;
}

/// Low trust lets a held grudge curdle into paranoia and suspicion.
fn distrust_feeds_grudge(snapshot: &AffectState, dt: f64, out: &mut InfluenceMap) {
    let (Some(trust), Some(grudge)) = (get(snapshot, "trust"), get(snapshot, "grudge")) else {
        return;
    };
    if trust < 0.3 {
        let inf = grudge * 0.3 * dt;
        add(out, "paranoia", inf);
        add(out, "skepticism", 0.6 * inf);
        add(out, "aggression", 0.4 * inf);
    }
}

/// High energy plus high ambition breeds confidence and initiative.
fn drive_synergy(snapshot: &AffectState, dt: f64, out: &mut InfluenceMap) {
    let (Some(energy), Some(ambition)) = (get(snapshot, "energy"), get(snapshot, "ambition"))
    else {
        return;
    };
    if energy > 0.7 && ambition > 0.7 {
        add(out, "confidence", 0.2 * dt);
        add(out, "skepticism", -0.15 * dt);
        add(out, "proactivity", 0.1 * dt);
    }
}

/// Exhaustion sours everything it touches.
fn exhaustion_bleed(snapshot: &AffectState, dt: f64, out: &mut InfluenceMap) {
    let Some(fatigue) = get(snapshot, "fatigue") else {
        return;
    };
    if fatigue > 0.6 {
        let m = fatigue * dt;
        add(out, "grudge", 0.15 * m);
        add(out, "sadness", 0.2 * m);
        add(out, "tension", 0.25 * m);
        add(out, "confidence", -0.1 * m);
        add(out, "energy", -0.05 * m);
    }
}

/// Pride and confidence reinforce each other at the cost of empathy.
fn ego_loop(snapshot: &AffectState, dt: f64, out: &mut InfluenceMap) {
    let (Some(pride), Some(confidence)) = (get(snapshot, "pride"), get(snapshot, "confidence"))
    else {
        return;
    };
    if pride > 0.6 && confidence > 0.6 {
        let b = pride.min(confidence) * 0.1 * dt;
        add(out, "pride", b);
        add(out, "confidence", b);
        add(out, "empathy", -0.5 * b);
        add(out, "domineering", 0.3 * b);
    }
}

/// Aggression with energy behind it feeds itself and burns fuel.
fn agitation_spiral(snapshot: &AffectState, dt: f64, out: &mut InfluenceMap) {
    let (Some(aggression), Some(energy)) = (get(snapshot, "aggression"), get(snapshot, "energy"))
    else {
        return;
    };
    if aggression > 0.5 && energy > 0.5 {
        let s = aggression.min(energy) * 0.08 * dt;
        add(out, "aggression", s);
        add(out, "energy", s);
        add(out, "fatigue", 0.6 * s);
    }
}

/// Deep analysis plus rumination stalls decisions and drains energy.
fn analysis_paralysis(snapshot: &AffectState, dt: f64, out: &mut InfluenceMap) {
    let (Some(analytical), Some(rumination)) =
        (get(snapshot, "analytical"), get(snapshot, "rumination"))
    else {
        return;
    };
    if analytical > 0.7 && rumination > 0.6 {
        let d = analytical.min(rumination) * 0.12 * dt;
        add(out, "energy", -d);
        add(out, "decisiveness", -0.8 * d);
        add(out, "fatigue", 0.5 * d);
        add(out, "tension", 0.3 * d);
    }
}

/// Ambition, confidence, and energy all high: the character commits.
fn momentum(snapshot: &AffectState, dt: f64, out: &mut InfluenceMap) {
    let (Some(ambition), Some(confidence), Some(energy)) = (
        get(snapshot, "ambition"),
        get(snapshot, "confidence"),
        get(snapshot, "energy"),
    ) else {
        return;
    };
    if ambition > 0.6 && confidence > 0.6 && energy > 0.6 {
        let c = 0.08 * dt;
        add(out, "proactivity", c);
        add(out, "decisiveness", c);
        add(out, "stubbornness", 0.5 * c);
        add(out, "aggression", 0.3 * c);
    }
}

/// Severe distrust erodes warmth even without an active grudge.
fn isolation_drift(snapshot: &AffectState, dt: f64, out: &mut InfluenceMap) {
    let Some(trust) = get(snapshot, "trust") else {
        return;
    };
    if trust < 0.25 {
        let e = (0.25 - trust) * 0.1 * dt;
        add(out, "paranoia", e);
        add(out, "skepticism", e);
        add(out, "tension", e);
        add(out, "empathy", -0.5 * e);
    }
}
