//! Complex mental-state rules.
//!
//! Unlike cathartic events, mental states are pure observations: predicates
//! over deviation-from-baseline that never mutate the state, and every
//! matching state is reported.

use crate::types::{AffectState, TraitConfigMap};

/// Read-only view pairing current values with configured baselines.
pub struct DeviationView<'a> {
    state: &'a AffectState,
    config: &'a TraitConfigMap,
    threshold: f64,
}

impl<'a> DeviationView<'a> {
    /// Build a view with the given deviation threshold.
    #[must_use]
    pub fn new(state: &'a AffectState, config: &'a TraitConfigMap, threshold: f64) -> Self {
        Self {
            state,
            config,
            threshold,
        }
    }

    /// Current value of a trait, 0.0 if absent.
    #[must_use]
    pub fn value(&self, name: &str) -> f64 {
        self.state.get(name).copied().unwrap_or(0.0)
    }

    /// Configured baseline of a trait, 0.5 if unconfigured.
    #[must_use]
    pub fn baseline(&self, name: &str) -> f64 {
        self.config.get(name).map_or(0.5, |c| c.baseline)
    }

    /// Is the trait more than `threshold` above its baseline?
    #[must_use]
    pub fn high(&self, name: &str) -> bool {
        self.value(name) > self.baseline(name) + self.threshold
    }

    /// Is the trait more than `threshold` below its baseline?
    #[must_use]
    pub fn low(&self, name: &str) -> bool {
        self.value(name) < self.baseline(name) - self.threshold
    }
}

/// One complex mental state.
pub struct MentalStateRule {
    /// Stable identifier.
    pub name: &'static str,
    /// Description surfaced verbatim in the prompt fragment.
    pub description: &'static str,
    /// Does the state's trait pattern match?
    pub trigger: fn(&DeviationView<'_>) -> bool,
}

/// All complex mental states, in report order.
pub const RULES: &[MentalStateRule] = &[
    MentalStateRule {
        name: "contempt",
        description: "Contempt: A feeling of superiority and disdain for others.",
        trigger: |v| v.high("pride") && v.high("skepticism") && v.low("empathy"),
    },
    MentalStateRule {
        name: "melancholy",
        description: "Melancholy: A deep, reflective, and withdrawn sadness.",
        trigger: |v| {
            v.high("sadness") && v.high("rumination") && v.high("introversion") && v.low("energy")
        },
    },
    MentalStateRule {
        name: "indignation",
        description: "Indignation: A righteous, driving anger against something perceived as \
                      unjust.",
        trigger: |v| v.high("moral_violation") && v.high("aggression") && v.high("confidence"),
    },
    MentalStateRule {
        name: "smugness",
        description: "Smugness: A self-satisfied pride and cutting sense of superiority.",
        trigger: |v| {
            v.high("pride")
                && v.high("confidence")
                && v.low("empathy")
                && v.value("humor") > v.baseline("humor") + 0.1
        },
    },
    MentalStateRule {
        name: "vindictiveness",
        description: "Vindictiveness: A cold, calculated, and patient desire for revenge.",
        trigger: |v| {
            v.high("grudge") && v.high("ambition") && v.high("analytical") && v.low("energy")
        },
    },
    MentalStateRule {
        name: "existential_dread",
        description: "Existential Dread: An overwhelming, analytical fear about the nature of \
                      existence.",
        trigger: |v| v.high("fear") && v.high("rumination") && v.high("analytical"),
    },
    MentalStateRule {
        name: "schadenfreude",
        description: "Schadenfreude: Taking pleasure in the misfortune of others.",
        trigger: |v| {
            v.high("antagonism")
                && v.low("empathy")
                && v.value("humor") > v.baseline("humor") + 0.1
        },
    },
    MentalStateRule {
        name: "impostor_syndrome",
        description: "Impostor Syndrome: Feeling like a fraud, wracked with self-doubt despite \
                      success.",
        trigger: |v| v.low("confidence") && v.high("rumination") && v.value("tension") > 0.5,
    },
    MentalStateRule {
        name: "protective_aggression",
        description: "Protective Aggression: A fierce, almost violent need to defend someone or \
                      something you care about.",
        trigger: |v| v.high("empathy") && v.high("aggression") && v.high("moral_violation"),
    },
    MentalStateRule {
        name: "alpha_dominance",
        description: "Alpha Dominance: An aggressive, confident drive to establish superiority \
                      and control.",
        trigger: |v| {
            v.high("aggression") && v.high("confidence") && v.high("energy") && v.low("empathy")
        },
    },
    MentalStateRule {
        name: "stubborn_pride",
        description: "Stubborn Pride: An inflexible determination to never back down or admit \
                      error.",
        trigger: |v| v.high("stubbornness") && v.high("pride") && v.low("openness"),
    },
    MentalStateRule {
        name: "driven_focus",
        description: "Driven Focus: An intense, goal-oriented energy that demands immediate \
                      action.",
        trigger: |v| {
            v.high("ambition") && v.high("energy") && v.high("proactivity") && v.low("fatigue")
        },
    },
    MentalStateRule {
        name: "brotherly_loyalty",
        description: "Brotherly Loyalty: A fierce, protective devotion to those you consider \
                      worthy.",
        trigger: |v| v.high("trust") && v.high("empathy") && v.high("mission_driven"),
    },
    MentalStateRule {
        name: "strategic_suspicion",
        description: "Strategic Suspicion: A calculating wariness that analyzes every angle for \
                      potential threats.",
        trigger: |v| v.high("paranoia") && v.high("analytical") && v.high("skepticism"),
    },
    MentalStateRule {
        name: "lone_wolf",
        description: "Lone Wolf Mentality: A self-reliant independence that trusts no one but \
                      yourself.",
        trigger: |v| v.low("trust") && v.high("autonomy") && v.high("confidence"),
    },
    MentalStateRule {
        name: "mocking_superiority",
        description: "Mocking Superiority: A cutting, sarcastic wit used to diminish others.",
        trigger: |v| v.high("humor") && v.high("antagonism") && v.high("confidence"),
    },
    MentalStateRule {
        name: "burnout_spiral",
        description: "Burnout Spiral: Mental and physical exhaustion creating a cycle of \
                      overthinking and stress.",
        trigger: |v| {
            v.high("fatigue") && v.high("tension") && v.low("energy") && v.high("rumination")
        },
    },
    MentalStateRule {
        name: "wounded_healer",
        description: "Wounded Healer: Using your own pain to understand and help others, despite \
                      your own brokenness.",
        trigger: |v| {
            v.high("empathy")
                && v.high("sadness")
                && v.high("mission_driven")
                && v.low("confidence")
        },
    },
    MentalStateRule {
        name: "righteous_fury",
        description: "Righteous Fury: A holy anger that burns away doubt and hesitation in \
                      service of justice.",
        trigger: |v| {
            v.high("moral_violation") && v.high("confidence") && v.high("energy") && v.low("fear")
        },
    },
    MentalStateRule {
        name: "paternal_instinct",
        description: "Paternal Instinct: A deep, protective drive to guide and shield others \
                      from harm.",
        trigger: |v| {
            v.high("empathy")
                && v.high("mission_driven")
                && v.high("proactivity")
                && v.low("self_interest")
        },
    },
    MentalStateRule {
        name: "battle_fatigue",
        description: "Battle Fatigue: Exhausted but refusing to yield, running on willpower \
                      alone.",
        trigger: |v| {
            v.high("fatigue") && v.high("tension") && v.low("hope") && v.high("stubbornness")
        },
    },
    MentalStateRule {
        name: "hypervigilance",
        description: "Hypervigilance: You are on edge, scanning for threats with relentless \
                      focus.",
        trigger: |v| v.high("paranoia") && v.high("analytical") && v.high("energy"),
    },
    MentalStateRule {
        name: "charismatic_leadership",
        description: "Charismatic Leadership: You radiate confidence and inspire others to \
                      follow your lead.",
        trigger: |v| {
            v.high("confidence") && v.high("proactivity") && v.high("trust") && v.high("ambition")
        },
    },
    MentalStateRule {
        name: "cynical_humor",
        description: "Cynical Humor: You use dark biting obscene wit to mask your distrust of \
                      others.",
        trigger: |v| v.high("humor") && v.high("skepticism") && v.low("trust"),
    },
    MentalStateRule {
        name: "stoic_resilience",
        description: "Stoic Resilience: You weather adversity with calm, unshakeable resolve.",
        trigger: |v| {
            v.high("introversion") && v.high("confidence") && v.low("fatigue") && v.low("sadness")
        },
    },
    MentalStateRule {
        name: "obsessive_focus",
        description: "Obsessive Focus: You become fixated on a single goal, shutting out all \
                      distractions.",
        trigger: |v| {
            v.high("analytical") && v.high("ambition") && v.high("rumination") && v.low("openness")
        },
    },
    MentalStateRule {
        name: "nurturing_tenderness",
        description: "Nurturing Tenderness: A deep, gentle desire to care for and protect \
                      someone, feeling their vulnerabilities as your own.",
        trigger: |v| v.high("empathy") && v.high("trust") && v.low("aggression"),
    },
    MentalStateRule {
        name: "anxious_people_pleasing",
        description: "Anxious People-Pleasing: A stressful, worried drive to maintain social \
                      harmony and keep everyone happy, often at the expense of your own needs \
                      and feelings.",
        trigger: |v| v.high("empathy") && v.low("confidence") && v.high("tension"),
    },
    MentalStateRule {
        name: "graceful_resilience",
        description: "Graceful Resilience: Carrying a private sorrow or exhaustion with poise \
                      and strength, finding reasons for optimism even when personally weary.",
        trigger: |v| {
            v.high("confidence")
                && v.high("hope")
                && (v.value("sadness") > 0.4 || v.value("fatigue") > 0.5)
        },
    },
    MentalStateRule {
        name: "scorned_fury",
        description: "Scorned Fury: A furious, deeply personal anger born from being profoundly \
                      wronged and disrespected, fueled by both pride and pain.",
        trigger: |v| v.high("pride") && v.high("moral_violation") && v.high("sadness"),
    },
];

/// Collect descriptions of every mental state matching the current deviation
/// pattern.
#[must_use]
pub fn collect_all(
    state: &AffectState,
    config: &TraitConfigMap,
    threshold: f64,
) -> Vec<&'static str> {
    let view = DeviationView::new(state, config, threshold);
    RULES
        .iter()
        .filter(|rule| (rule.trigger)(&view))
        .map(|rule| rule.description)
        .collect()
}
