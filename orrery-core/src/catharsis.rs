//! Cathartic event rules.
//!
//! A catharsis is a discontinuous rewrite of the affect state triggered when
//! a combination of traits crosses its thresholds. Rules are checked in
//! declaration order and at most one fires per tick; the first match wins.
//! Missing traits read as 0.0 for triggers and are skipped by overwrites.

use crate::types::{AffectState, TraitConfigMap};

/// One cathartic event: a trigger predicate and the state rewrite it causes.
pub struct CatharsisRule {
    /// Stable identifier, used in logs.
    pub name: &'static str,
    /// Second-person description surfaced in the prompt fragment.
    pub description: &'static str,
    /// Does the current state trip this event?
    pub trigger: fn(&AffectState) -> bool,
    /// Overwrite the state. Only traits present in the map are touched.
    pub apply: fn(&mut AffectState, &TraitConfigMap),
}

fn val(state: &AffectState, name: &str) -> f64 {
    state.get(name).copied().unwrap_or(0.0)
}

fn set(state: &mut AffectState, name: &str, value: f64) {
    if let Some(v) = state.get_mut(name) {
        *v = value;
    }
}

fn set_baseline(state: &mut AffectState, config: &TraitConfigMap, name: &str) {
    let baseline = config.get(name).map(|c| c.baseline);
    if let (Some(v), Some(b)) = (state.get_mut(name), baseline) {
        *v = b;
    }
}

fn bump(state: &mut AffectState, name: &str, delta: f64) {
    if let Some(v) = state.get_mut(name) {
        *v = (*v + delta).clamp(0.0, 1.0);
    }
}

fn scale(state: &mut AffectState, name: &str, factor: f64) {
    if let Some(v) = state.get_mut(name) {
        *v *= factor;
    }
}

/// All cathartic events, in priority order.
pub const RULES: &[CatharsisRule] = &[
    CatharsisRule {
        name: "paranoid_breakdown",
        description: "You have a volatile paranoid breakdown, shattering your trust.",
        trigger: |s| val(s, "paranoia") > 0.85 && val(s, "tension") > 0.8,
        apply: |s, c| {
            set_baseline(s, c, "paranoia");
            set_baseline(s, c, "tension");
            set(s, "trust", 0.0);
            set(s, "fatigue", 0.9);
            set(s, "guilt", 0.7);
            set(s, "aggression", 0.1);
        },
    },
    CatharsisRule {
        name: "vindictive_focus",
        description: "Your simmering grudge has crystallized into a cold, vindictive focus. \
                      You now have a clear, vengeful purpose.",
        trigger: |s| {
            val(s, "grudge") > 0.8 && val(s, "analytical") > 0.7 && val(s, "energy") < 0.3
        },
        apply: |s, _| {
            set(s, "grudge", 0.5);
            bump(s, "ambition", 0.4);
            bump(s, "mission_driven", 0.3);
            set(s, "energy", 0.7);
        },
    },
    CatharsisRule {
        name: "hopeful_clarity",
        description: "You experience a profound moment of hopeful clarity, washing away old \
                      grudges and filling you with new energy.",
        trigger: |s| val(s, "hope") > 0.8 && val(s, "openness") > 0.8 && val(s, "fatigue") < 0.2,
        apply: |s, c| {
            set_baseline(s, c, "hope");
            set(s, "grudge", 0.1);
            set(s, "skepticism", 0.2);
            set(s, "energy", 0.9);
        },
    },
    CatharsisRule {
        name: "explosive_anger",
        description: "You explode in a burst of raw anger, releasing all your pent-up tension.",
        trigger: |s| {
            val(s, "aggression") > 0.75 && val(s, "tension") > 0.7 && val(s, "energy") > 0.6
        },
        apply: |s, _| {
            set(s, "aggression", 0.2);
            set(s, "tension", 0.1);
            set(s, "energy", 0.3);
            set(s, "fatigue", 0.8);
            set(s, "guilt", 0.4);
        },
    },
    CatharsisRule {
        name: "competitive_surge",
        description: "A surge of strongly competitive fire ignites within you, driving you to \
                      take immediate, decisive action.",
        trigger: |s| {
            val(s, "ambition") > 0.8 && val(s, "confidence") > 0.7 && val(s, "energy") > 0.7
        },
        apply: |s, _| {
            set(s, "energy", 1.0);
            bump(s, "proactivity", 0.3);
            bump(s, "decisiveness", 0.2);
            set(s, "fatigue", 0.1);
        },
    },
    CatharsisRule {
        name: "pride_crash",
        description: "Your pride crumbles completely, leaving you questioning everything about \
                      yourself in painful self-reflection.",
        trigger: |s| val(s, "pride") > 0.8 && val(s, "confidence") < 0.3,
        apply: |s, _| {
            set(s, "pride", 0.1);
            set(s, "confidence", 0.1);
            set(s, "energy", 0.2);
            set(s, "rumination", 0.8);
            bump(s, "introversion", 0.3);
        },
    },
    CatharsisRule {
        name: "righteous_fury",
        description: "Betrayal ignites a righteous fury within you - all hesitation vanishes as \
                      you focus on what must be done.",
        trigger: |s| {
            val(s, "moral_violation") > 0.7 && val(s, "trust") < 0.2 && val(s, "grudge") > 0.6
        },
        apply: |s, _| {
            set(s, "aggression", 0.8);
            bump(s, "mission_driven", 0.4);
            set(s, "trust", 0.0);
            set(s, "energy", 0.9);
            set(s, "guilt", 0.0);
        },
    },
    CatharsisRule {
        name: "shame_spiral",
        description: "The weight of shame and guilt becomes unbearable, causing you to withdraw \
                      completely from the world.",
        trigger: |s| val(s, "guilt") > 0.7 && val(s, "rumination") > 0.7,
        apply: |s, _| {
            set(s, "guilt", 0.2);
            set(s, "energy", 0.2);
            bump(s, "introversion", 0.4);
            bump(s, "trust", -0.3);
        },
    },
    CatharsisRule {
        name: "protective_rage",
        description: "A primal protective fury awakens - nothing else matters except defending \
                      what you hold sacred.",
        trigger: |s| {
            val(s, "empathy") > 0.6 && val(s, "moral_violation") > 0.8 && val(s, "energy") > 0.5
        },
        apply: |s, _| {
            set(s, "aggression", 0.9);
            set(s, "energy", 1.0);
            set(s, "fear", 0.0);
            set(s, "confidence", 0.8);
            bump(s, "mission_driven", 0.3);
        },
    },
    CatharsisRule {
        name: "stoic_shutdown",
        description: "You shut down emotionally, retreating behind walls of logic and detachment \
                      to survive.",
        trigger: |s| {
            val(s, "tension") > 0.8 && val(s, "fatigue") > 0.7 && val(s, "empathy") > 0.6
        },
        apply: |s, _| {
            set(s, "empathy", 0.1);
            set(s, "tension", 0.2);
            set(s, "energy", 0.3);
            bump(s, "introversion", 0.3);
            bump(s, "analytical", 0.2);
        },
    },
    CatharsisRule {
        name: "epiphany",
        description: "A sudden flash of insight brings clarity, sweeping away confusion and \
                      filling you with purpose.",
        trigger: |s| {
            val(s, "analytical") > 0.8 && val(s, "openness") > 0.8 && val(s, "energy") > 0.8
        },
        apply: |s, _| {
            set(s, "confusion", 0.1);
            set(s, "rumination", 0.1);
            bump(s, "confidence", 0.4);
            bump(s, "decisiveness", 0.5);
        },
    },
    CatharsisRule {
        name: "emotional_numbness",
        description: "You shut down emotionally, feeling numb and disconnected from your \
                      surroundings.",
        trigger: |s| {
            val(s, "fatigue") > 0.9 && (val(s, "sadness") > 0.8 || val(s, "fear") > 0.8)
        },
        apply: |s, _| {
            for name in ["sadness", "fear", "joy", "excitement", "empathy"] {
                scale(s, name, 0.2);
            }
            if let Some(v) = s.get_mut("energy") {
                *v = (*v - 0.3).max(0.1);
            }
        },
    },
    CatharsisRule {
        name: "redemptive_forgiveness",
        description: "You let go of your resentment, choosing forgiveness and opening yourself \
                      to hope.",
        trigger: |s| val(s, "grudge") > 0.7 && val(s, "empathy") > 0.7 && val(s, "trust") > 0.6,
        apply: |s, _| {
            bump(s, "grudge", -0.5);
            bump(s, "trust", 0.2);
            bump(s, "hope", 0.3);
        },
    },
    CatharsisRule {
        name: "manic_burst",
        description: "A manic surge propels you into a whirlwind of activity and ideas.",
        trigger: |s| {
            val(s, "energy") > 0.8 && val(s, "excitement") > 0.8 && val(s, "fatigue") < 0.3
        },
        apply: |s, _| {
            set(s, "energy", 1.0);
            bump(s, "confidence", 0.3);
            bump(s, "proactivity", 0.4);
            bump(s, "recklessness", 0.3);
        },
    },
    CatharsisRule {
        name: "collapse",
        description: "Overwhelmed by emotion, you collapse inward, needing time to recover.",
        trigger: |s| {
            val(s, "tension") > 0.8
                && val(s, "fatigue") > 0.8
                && val(s, "sadness") > 0.8
                && val(s, "paranoia") > 0.8
        },
        apply: |s, _| {
            set(s, "tension", 0.2);
            set(s, "fatigue", 0.5);
            set(s, "energy", 0.2);
            bump(s, "introversion", 0.3);
            bump(s, "rumination", 0.2);
        },
    },
    CatharsisRule {
        name: "empathic_burnout",
        description: "The weight of everyone else's feelings becomes too much to bear. You shut \
                      down emotionally, retreating into a quiet, numb space to protect yourself \
                      from the noise.",
        trigger: |s| {
            val(s, "empathy") > 0.8 && val(s, "fatigue") > 0.8 && val(s, "tension") > 0.7
        },
        apply: |s, _| {
            scale(s, "empathy", 0.2);
            if let Some(v) = s.get_mut("energy") {
                *v = (*v - 0.4).max(0.1);
            }
            bump(s, "introversion", 0.5);
            set(s, "fatigue", 0.9);
            scale(s, "openness", 0.5);
        },
    },
    CatharsisRule {
        name: "overflowing_joy",
        description: "A moment of pure, unadulterated joy washes over you, born from a deep \
                      connection with another. The world feels full of light and possibility, \
                      and old hurts seem to melt away.",
        trigger: |s| val(s, "hope") > 0.8 && val(s, "trust") > 0.8 && val(s, "energy") > 0.8,
        apply: |s, _| {
            bump(s, "grudge", -0.5);
            bump(s, "skepticism", -0.4);
            bump(s, "sadness", -0.5);
            set(s, "hope", 1.0);
            set(s, "energy", 1.0);
            set(s, "fatigue", 0.1);
        },
    },
    CatharsisRule {
        name: "shattered_confidence",
        description: "A trust you held sacred has been shattered. The vulnerability you shared \
                      is now a source of deep pain, leaving you feeling foolish and determined \
                      never to make that mistake again.",
        trigger: |s| {
            val(s, "trust") < 0.1 && val(s, "grudge") > 0.7 && val(s, "moral_violation") > 0.6
        },
        apply: |s, _| {
            set(s, "trust", 0.0);
            if let Some(v) = s.get_mut("openness") {
                *v = (*v * 0.4).max(0.2);
            }
            if let Some(v) = s.get_mut("skepticism") {
                *v = (*v + 0.3).min(0.9);
            }
            bump(s, "rumination", 0.4);
            scale(s, "empathy", 0.6);
        },
    },
];

/// Find the first rule triggered by `state`, if any.
#[must_use]
pub fn find_first(state: &AffectState) -> Option<&'static CatharsisRule> {
    RULES.iter().find(|rule| (rule.trigger)(state))
}
