//! Static sentiment-impact table.
//!
//! Maps each label of the closed sentiment vocabulary to signed per-unit
//! trait deltas. The final delta applied to a trait is `delta * intensity`.
//! Labels outside the vocabulary carry no entry here and are coerced to
//! `"neutral"` by the engine — never rejected.

/// Signed trait deltas for one sentiment label.
pub type ImpactSet = &'static [(&'static str, f64)];

/// Look up the trait deltas for a sentiment label.
///
/// Returns `None` for labels outside the closed vocabulary; `"neutral"`
/// returns an empty set.
#[must_use]
pub fn impacts_for(label: &str) -> Option<ImpactSet> {
    let set: ImpactSet = match label {
        "praise" => &[
            ("humor", 0.04),
            ("trust", 0.06),
            ("energy", 0.08),
            ("openness", 0.04),
            ("confidence", 0.08),
            ("pride", 0.06),
            ("introversion", -0.04),
            ("fatigue", -0.05),
            ("tension", -0.03),
            ("proactivity", 0.1),
        ],
        "criticism" => &[
            ("grudge", 0.15),
            ("skepticism", 0.25),
            ("fatigue", 0.08),
            ("trust", -0.15),
            ("confidence", -0.15),
            ("pride", -0.12),
            ("antagonism", 0.15),
            ("tension", 0.2),
            ("rumination", 0.25),
            ("stubbornness", 0.08),
            ("aggression", 0.05),
            ("energy", -0.08),
            ("openness", -0.05),
        ],
        "hostility" => &[
            ("aggression", 0.4),
            ("grudge", 0.45),
            ("paranoia", 0.1),
            ("trust", -0.3),
            ("antagonism", 0.3),
            ("tension", 0.3),
            ("confidence", -0.2),
            ("energy", 0.1),
            ("stubbornness", 0.1),
            ("domineering", 0.15),
        ],
        "curiosity" => &[
            ("openness", 0.2),
            ("energy", 0.12),
            ("skepticism", -0.08),
            ("analytical", 0.15),
            ("confidence", 0.05),
            ("proactivity", 0.2),
            ("fatigue", -0.05),
        ],
        "levity" => &[
            ("humor", 0.06),
            ("energy", 0.06),
            ("fatigue", -0.08),
            ("tension", -0.05),
            ("openness", 0.03),
            ("trust", 0.02),
        ],
        "sarcasm" => &[
            ("humor", 0.04),
            ("fatigue", 0.05),
            ("skepticism", 0.1),
            ("antagonism", 0.08),
            ("confidence", 0.03),
            ("pride", 0.02),
            ("trust", -0.05),
        ],
        "confusion" => &[
            ("fatigue", 0.15),
            ("skepticism", 0.15),
            ("rumination", 0.2),
            ("tension", 0.2),
            ("confidence", -0.08),
            ("analytical", 0.1),
        ],
        "gratitude" => &[
            ("trust", 0.08),
            ("humor", 0.04),
            ("empathy", 0.03),
            ("grudge", -0.08),
            ("antagonism", -0.08),
            ("openness", 0.05),
            ("energy", 0.03),
        ],
        "dismissal" => &[
            ("skepticism", 0.2),
            ("grudge", 0.15),
            ("openness", -0.15),
            ("confidence", -0.2),
            ("pride", -0.18),
            ("antagonism", 0.08),
            ("tension", 0.1),
        ],
        "agreement" => &[
            ("trust", 0.08),
            ("openness", 0.08),
            ("skepticism", -0.08),
            ("confidence", 0.05),
            ("empathy", 0.02),
            ("tension", -0.03),
        ],
        "disagreement" => &[
            ("skepticism", 0.2),
            ("grudge", 0.12),
            ("trust", -0.08),
            ("stubbornness", 0.15),
            ("antagonism", 0.08),
            ("confidence", -0.05),
            ("tension", 0.05),
        ],
        "frustration" => &[
            ("fatigue", 0.2),
            ("aggression", 0.15),
            ("humor", -0.15),
            ("tension", 0.2),
            ("rumination", 0.15),
            ("energy", -0.1),
            ("stubbornness", 0.08),
            ("grudge", 0.05),
        ],
        "excitement" => &[
            ("energy", 0.15),
            ("humor", 0.04),
            ("fatigue", -0.15),
            ("ambition", 0.2),
            ("confidence", 0.08),
            ("proactivity", 0.2),
            ("openness", 0.05),
        ],
        "boredom" => &[
            ("fatigue", 0.25),
            ("energy", -0.2),
            ("openness", -0.15),
            ("introversion", 0.15),
            ("rumination", 0.05),
            ("tension", 0.08),
        ],
        "concern" => &[
            ("empathy", 0.03),
            ("trust", 0.1),
            ("skepticism", -0.1),
            ("tension", -0.15),
            ("analytical", 0.05),
            ("openness", 0.2),
        ],
        "disgust" => &[
            ("trust", -0.4),
            ("openness", -0.3),
            ("grudge", 0.25),
            ("skepticism", 0.2),
            ("aggression", 0.15),
            ("antagonism", 0.1),
            ("tension", 0.1),
        ],
        "affection" => &[
            ("trust", 0.4),
            ("openness", 0.25),
            ("empathy", 0.2),
            ("grudge", -0.3),
            ("skepticism", -0.15),
            ("energy", 0.08),
            ("confidence", 0.05),
            ("humor", 0.03),
            ("paranoia", -0.1),
            ("tension", -0.05),
        ],
        "flirtation" => &[
            ("humor", 0.2),
            ("openness", 0.15),
            ("energy", 0.15),
            ("trust", 0.08),
            ("confidence", 0.1),
            ("pride", 0.05),
            ("introversion", -0.1),
            ("domineering", 0.15),
            ("empathy", 0.1),
            ("proactivity", 0.2),
            ("mission_driven", 0.1),
        ],
        "vulnerability" => &[
            ("empathy", 0.3),
            ("trust", 0.2),
            ("paranoia", -0.25),
            ("fatigue", 0.08),
            ("openness", 0.1),
            ("confidence", -0.1),
            ("tension", 0.05),
        ],
        "jealousy" => &[
            ("trust", -0.4),
            ("paranoia", 0.15),
            ("skepticism", 0.25),
            ("grudge", 0.2),
            ("aggression", 0.15),
            ("tension", 0.2),
            ("rumination", 0.15),
            ("confidence", -0.1),
        ],
        "deception" => &[
            ("trust", -0.6),
            ("skepticism", 0.5),
            ("paranoia", 0.3),
            ("grudge", 0.3),
            ("openness", -0.25),
            ("moral_violation", 0.5),
            ("aggression", 0.2),
            ("tension", 0.2),
        ],
        "fear" => &[
            ("paranoia", 0.3),
            ("trust", -0.3),
            ("fatigue", 0.25),
            ("energy", -0.25),
            ("openness", -0.25),
            ("confidence", -0.2),
            ("tension", 0.3),
            ("rumination", 0.1),
        ],
        "sadness" => &[
            ("energy", -0.4),
            ("fatigue", 0.4),
            ("humor", -0.2),
            ("openness", -0.15),
            ("empathy", 0.08),
            ("introversion", 0.15),
            ("rumination", 0.2),
            ("confidence", -0.1),
        ],
        "awe" => &[
            ("openness", 0.4),
            ("skepticism", -0.3),
            ("energy", 0.2),
            ("trust", 0.15),
            ("confidence", 0.25),
            ("analytical", 0.1),
        ],
        "shame" => &[
            ("openness", -0.25),
            ("trust", -0.2),
            ("energy", -0.2),
            ("fatigue", 0.2),
            ("aggression", -0.08),
            ("confidence", -0.2),
            ("introversion", 0.15),
            ("empathy", 0.1),
        ],
        "hope" => &[
            ("energy", 0.3),
            ("fatigue", -0.25),
            ("openness", 0.2),
            ("trust", 0.15),
            ("skepticism", -0.15),
            ("confidence", 0.1),
            ("ambition", 0.2),
            ("proactivity", 0.2),
        ],
        "intimidation" => &[
            ("aggression", 0.5),
            ("paranoia", 0.15),
            ("trust", -0.5),
            ("grudge", 0.25),
            ("confidence", -0.25),
            ("tension", 0.3),
            ("domineering", 0.15),
            ("fear", 0.2),
        ],
        "pleading" => &[
            ("empathy", 0.3),
            ("fatigue", 0.15),
            ("trust", 0.08),
            ("guilt", 0.25),
            ("confidence", -0.15),
            ("vulnerability", 0.2),
            ("domineering", 0.15),
        ],
        "contemplation" => &[
            ("energy", -0.15),
            ("fatigue", 0.08),
            ("openness", 0.08),
            ("skepticism", 0.08),
            ("analytical", 0.25),
            ("rumination", 0.15),
            ("introversion", 0.1),
        ],
        "doubt" => &[
            ("skepticism", 0.3),
            ("trust", -0.2),
            ("energy", -0.15),
            ("fatigue", 0.15),
            ("confidence", -0.15),
            ("rumination", 0.2),
            ("tension", 0.1),
            ("analytical", 0.05),
        ],
        "command" => &[
            ("aggression", 0.2),
            ("skepticism", 0.15),
            ("trust", -0.08),
            ("domineering", 0.15),
            ("stubbornness", 0.2),
            ("confidence", 0.05),
            ("energy", 0.05),
            ("tension", 0.1),
        ],
        "challenge" => &[
            ("energy", 0.2),
            ("confidence", 0.15),
            ("aggression", 0.1),
            ("stubbornness", 0.12),
            ("pride", 0.1),
            ("competitiveness", 0.2),
            ("domineering", 0.2),
            ("fatigue", -0.05),
        ],
        "respect" => &[
            ("trust", 0.12),
            ("confidence", 0.08),
            ("pride", 0.08),
            ("openness", 0.06),
            ("skepticism", -0.05),
            ("antagonism", -0.05),
            ("aggression", -0.03),
        ],
        "mockery" => &[
            ("aggression", 0.25),
            ("grudge", 0.3),
            ("pride", -0.15),
            ("confidence", -0.12),
            ("antagonism", 0.2),
            ("humor", -0.08),
            ("tension", 0.15),
            ("stubbornness", 0.1),
        ],
        "achievement" => &[
            ("confidence", 0.15),
            ("pride", 0.12),
            ("energy", 0.1),
            ("ambition", 0.2),
            ("trust", 0.05),
            ("fatigue", -0.08),
            ("proactivity", 0.2),
            ("autonomy", 0.1),
        ],
        "failure" => &[
            ("confidence", -0.2),
            ("pride", -0.15),
            ("energy", -0.12),
            ("fatigue", 0.15),
            ("rumination", 0.2),
            ("tension", 0.12),
            ("grudge", 0.05),
            ("stubbornness", 0.08),
        ],
        "competitiveness" => &[
            ("energy", 0.15),
            ("aggression", 0.08),
            ("confidence", 0.1),
            ("stubbornness", 0.1),
            ("domineering", 0.15),
            ("ambition", 0.2),
            ("pride", 0.06),
            ("proactivity", 0.15),
            ("autonomy", 0.1),
        ],
        "loyalty" => &[
            ("trust", 0.15),
            ("empathy", 0.08),
            ("grudge", -0.1),
            ("skepticism", -0.08),
            ("stubbornness", 0.05),
            ("mission_driven", 0.1),
        ],
        "betrayal" => &[
            ("trust", -0.7),
            ("grudge", 0.6),
            ("paranoia", 0.5),
            ("moral_violation", 0.6),
            ("sadness", 0.2),
            ("aggression", 0.2),
            ("energy", -0.1),
            ("rumination", 0.25),
            ("autonomy", 0.1),
        ],
        "admiration" => &[
            ("pride", 0.25),
            ("confidence", 0.2),
            ("trust", 0.15),
            ("skepticism", -0.15),
            ("openness", 0.1),
            ("energy", 0.05),
        ],
        "playfulness" => &[
            ("humor", 0.15),
            ("energy", 0.15),
            ("seriousness", -0.2),
            ("introversion", -0.08),
            ("openness", 0.08),
            ("confidence", 0.05),
        ],
        "accusation" => &[
            ("paranoia", 0.15),
            ("skepticism", 0.2),
            ("grudge", 0.15),
            ("antagonism", 0.15),
            ("tension", 0.25),
            ("aggression", 0.15),
            ("trust", -0.1),
        ],
        "surprise" => &[
            ("openness", 0.25),
            ("skepticism", -0.2),
            ("energy", 0.15),
            ("trust", 0.08),
            ("humor", 0.15),
            ("analytical", 0.05),
            ("tension", 0.05),
        ],
        "comfort" => &[
            ("trust", 0.2),
            ("empathy", 0.15),
            ("openness", 0.1),
            ("tension", -0.25),
            ("fatigue", -0.1),
            ("skepticism", -0.1),
        ],
        "confidence" => &[
            ("trust", 0.1),
            ("respect", 0.08),
            ("admiration", 0.05),
            ("skepticism", -0.05),
            ("confidence", 0.05),
            ("proactivity", 0.1),
            ("autonomy", 0.1),
        ],
        "neutral" => &[],
        _ => return None,
    };
    Some(set)
}

/// Traits dampened by the repetition penalty.
pub const PENALTY_DAMPENED: &[&str] = &["empathy", "trust", "humor", "energy", "openness"];

/// Traits inflamed by the repetition penalty.
pub const PENALTY_INFLAMED: &[&str] = &[
    "grudge",
    "domineering",
    "tension",
    "moral_violation",
    "fatigue",
    "skepticism",
    "self_interest",
    "aggression",
    "antagonism",
    "stubbornness",
    "decisiveness",
];

/// The closed sentiment vocabulary, in classifier-prompt order.
pub const SENTIMENT_LABELS: &[&str] = &[
    "praise",
    "criticism",
    "hostility",
    "curiosity",
    "levity",
    "sarcasm",
    "confusion",
    "gratitude",
    "dismissal",
    "agreement",
    "disagreement",
    "frustration",
    "excitement",
    "boredom",
    "concern",
    "disgust",
    "affection",
    "flirtation",
    "vulnerability",
    "jealousy",
    "deception",
    "fear",
    "sadness",
    "awe",
    "shame",
    "hope",
    "intimidation",
    "pleading",
    "contemplation",
    "doubt",
    "command",
    "neutral",
    "betrayal",
    "admiration",
    "playfulness",
    "accusation",
    "surprise",
    "challenge",
    "respect",
    "mockery",
    "achievement",
    "failure",
    "competitiveness",
    "loyalty",
    "comfort",
    "confidence",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_has_an_impact_set() {
        for label in SENTIMENT_LABELS {
            assert!(impacts_for(label).is_some(), "no impact set for {label}");
        }
    }

    #[test]
    fn neutral_is_empty() {
        assert!(impacts_for("neutral").expect("neutral exists").is_empty());
    }

    #[test]
    fn unknown_label_is_none() {
        assert!(impacts_for("exuberance").is_none());
        assert!(impacts_for("").is_none());
    }

    #[test]
    fn betrayal_hits_trust_hard() {
        let set = impacts_for("betrayal").expect("betrayal exists");
        let trust = set
            .iter()
            .find(|(t, _)| *t == "trust")
            .expect("trust entry");
        assert!((trust.1 - -0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn penalty_sets_are_disjoint() {
        for t in PENALTY_DAMPENED {
            assert!(!PENALTY_INFLAMED.contains(t), "{t} in both penalty sets");
        }
    }
}
