//! The affect engine: impulses, ticks, and prompt-fragment rendering.
//!
//! One engine instance models one conversation's character. Sentiment
//! impulses nudge trait values; every tick runs coupling influences,
//! homeostatic restoration toward baseline, range clamping, and the
//! catharsis check. Elapsed wall-clock time is capped per tick so idle
//! conversations drift gently instead of jumping.

use std::time::Instant;

use tracing::{debug, trace};

use crate::catharsis;
use crate::config::EngineConfig;
use crate::coupling;
use crate::impact::{self, PENALTY_DAMPENED, PENALTY_INFLAMED};
use crate::mental_state;
use crate::mood;
use crate::types::{baseline_state, AffectState, MoodColor, TraitConfigMap};

/// A prompt note that survives a fixed number of renders before expiring.
#[derive(Debug, Clone)]
struct LingeringNote {
    text: String,
    renders_left: u8,
}

impl LingeringNote {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            renders_left: 2,
        }
    }
}

/// Take one render from a note slot, clearing it once spent.
fn render_note(slot: &mut Option<LingeringNote>) -> Option<String> {
    let note = slot.as_mut()?;
    let text = note.text.clone();
    note.renders_left -= 1;
    if note.renders_left == 0 {
        *slot = None;
    }
    Some(text)
}

const PENALTY_NOTICE: &str = "The user's MONOTONOUS and REPETITIOUS interaction with you is \
                              GRATING on your nerves and BORING! Your PATIENCE is wearing \
                              EXTREMELY THIN.";

const CLOSING_INSTRUCTION: &str = " Respond naturally with this full emotional context, of \
                                   which the user is mostly the source, in mind. Show, but do \
                                   not explicitly state these traits in your response.";

/// Affect engine for a single conversation.
pub struct AffectEngine {
    config: TraitConfigMap,
    engine_cfg: EngineConfig,
    state: AffectState,
    window: Vec<String>,
    penalty_active: bool,
    last_update: Instant,
    catharsis_note: Option<LingeringNote>,
    mental_note: Option<LingeringNote>,
    trait_note: Option<LingeringNote>,
}

impl AffectEngine {
    /// Create an engine with every trait at its baseline.
    #[must_use]
    pub fn new(config: TraitConfigMap, engine_cfg: EngineConfig) -> Self {
        let state = baseline_state(&config);
        Self::from_parts(config, engine_cfg, state, Vec::new(), false)
    }

    /// Rehydrate an engine from persisted state.
    #[must_use]
    pub fn from_parts(
        config: TraitConfigMap,
        engine_cfg: EngineConfig,
        state: AffectState,
        window: Vec<String>,
        penalty_active: bool,
    ) -> Self {
        Self {
            config,
            engine_cfg,
            state,
            window,
            penalty_active,
            last_update: Instant::now(),
            catharsis_note: None,
            mental_note: None,
            trait_note: None,
        }
    }

    /// Current trait values.
    #[must_use]
    pub fn state(&self) -> &AffectState {
        &self.state
    }

    /// Recent user sentiment labels, oldest first.
    #[must_use]
    pub fn window(&self) -> &[String] {
        &self.window
    }

    /// Is the repetition penalty currently active?
    #[must_use]
    pub fn penalty_active(&self) -> bool {
        self.penalty_active
    }

    /// Tear down into the persisted parts: state, window, penalty flag.
    #[must_use]
    pub fn into_parts(self) -> (AffectState, Vec<String>, bool) {
        (self.state, self.window, self.penalty_active)
    }

    /// Apply one sentiment impulse, then tick.
    ///
    /// Unknown labels are coerced to neutral. Only user-origin impulses join
    /// the repetition window; callers scale assistant intensities before
    /// invoking this.
    pub fn apply_impulse(&mut self, label: &str, intensity: f64, from_user: bool) {
        let label = if impact::impacts_for(label).is_some() {
            label
        } else {
            debug!(label, "unknown sentiment label, coercing to neutral");
            "neutral"
        };

        if from_user {
            self.window.push(label.to_string());
            if self.window.len() > self.engine_cfg.sentiment_window {
                self.window.remove(0);
            }
            self.recompute_penalty();
            trace!(
                window = ?self.window,
                penalty = self.penalty_active,
                "user sentiment recorded"
            );
        }

        if let Some(impacts) = impact::impacts_for(label) {
            for (name, delta) in impacts {
                if let Some(value) = self.state.get_mut(*name) {
                    *value += delta * intensity;
                }
            }
        }

        if self.penalty_active {
            let penalty = self.engine_cfg.repetition_penalty;
            for name in PENALTY_DAMPENED {
                if let Some(value) = self.state.get_mut(*name) {
                    *value -= penalty;
                }
            }
            for name in PENALTY_INFLAMED {
                if let Some(value) = self.state.get_mut(*name) {
                    *value += penalty;
                }
            }
        }

        self.tick();
    }

    fn recompute_penalty(&mut self) {
        let threshold = self.engine_cfg.repeat_threshold;
        self.penalty_active = self.window.len() >= threshold
            && self
                .window
                .iter()
                .rev()
                .take(threshold)
                .all(|s| Some(s) == self.window.last());
    }

    /// Advance the simulation by the capped wall-clock delta.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let dt = now
            .duration_since(self.last_update)
            .as_secs_f64()
            .min(self.engine_cfg.max_tick_seconds);
        self.last_update = now;
        self.tick_with(dt);
    }

    /// Advance the simulation by an explicit delta in seconds.
    ///
    /// All coupling rules read the same pre-tick snapshot, so the result is
    /// independent of rule order.
    pub fn tick_with(&mut self, dt: f64) {
        let influences = coupling::evaluate(&self.state, dt);

        for (name, cfg) in &self.config {
            let Some(value) = self.state.get_mut(name) else {
                continue;
            };
            *value += influences.get(name).copied().unwrap_or(0.0);
            *value += (cfg.baseline - *value) * (cfg.elasticity + cfg.decay) * dt;
        }
        self.clamp_all();

        if let Some(rule) = catharsis::find_first(&self.state) {
            debug!(event = rule.name, "cathartic event fired");
            (rule.apply)(&mut self.state, &self.config);
            self.clamp_all();
            self.catharsis_note = Some(LingeringNote::new(rule.description));
        }
    }

    fn clamp_all(&mut self) {
        for (name, cfg) in &self.config {
            if let Some(value) = self.state.get_mut(name) {
                *value = cfg.clamp(*value);
            }
        }
    }

    /// Render the emotional-context prompt fragment.
    ///
    /// Ticks first so idle decay is reflected. Returns an empty string when
    /// nothing is noteworthy. Catharsis, mental-state, and trait notes each
    /// linger for two renders after they last triggered.
    pub fn render_prompt_fragment(&mut self) -> String {
        self.tick();
        let mut parts: Vec<String> = Vec::new();

        if self.penalty_active {
            debug!("repetition penalty notice injected");
            parts.push(PENALTY_NOTICE.to_string());
        }

        if let Some(text) = render_note(&mut self.catharsis_note) {
            parts.push(text);
        }

        let states =
            mental_state::collect_all(&self.state, &self.config, self.engine_cfg.mental_state_threshold);
        if !states.is_empty() {
            self.mental_note = Some(LingeringNote::new(states.join(" ")));
        }
        if let Some(text) = render_note(&mut self.mental_note) {
            parts.push(format!(
                "CURRENT MENTAL STATE: You are currently experiencing: {text}"
            ));
        }

        let descriptions = self.trait_descriptions();
        if !descriptions.is_empty() {
            self.trait_note = Some(LingeringNote::new(format!(
                "You feel {}.",
                descriptions.join(", ")
            )));
        }
        if let Some(text) = render_note(&mut self.trait_note) {
            parts.push(format!("UNDERLYING TRAITS: {text}"));
        }

        if parts.is_empty() {
            return String::new();
        }
        let mut fragment = parts.join(" ");
        fragment.push_str(CLOSING_INSTRUCTION);
        fragment
    }

    fn trait_descriptions(&self) -> Vec<String> {
        let mut descriptions = Vec::new();
        for (name, value) in &self.state {
            let Some(cfg) = self.config.get(name) else {
                continue;
            };
            let deviation = value - cfg.baseline;
            let magnitude = deviation.abs();
            if magnitude < 0.15 {
                continue;
            }
            let strength = if magnitude < 0.3 {
                "a hint of"
            } else if magnitude < 0.5 {
                "a clear feeling of"
            } else {
                "an overwhelming sense of"
            };
            let direction = if deviation > 0.0 {
                "elevated"
            } else {
                "diminished"
            };
            descriptions.push(format!("{strength} {direction} {name}"));
        }
        descriptions
    }

    /// Current RGBA mood color.
    #[must_use]
    pub fn mood_color(&self) -> MoodColor {
        mood::mood_color(&self.state, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_trait_template;

    fn engine() -> AffectEngine {
        AffectEngine::new(default_trait_template(), EngineConfig::default())
    }

    #[test]
    fn impulse_moves_traits_and_stays_in_range() {
        let mut e = engine();
        e.apply_impulse("praise", 1.0, true);
        assert!(e.state()["trust"] > 0.5);
        for (name, value) in e.state() {
            let cfg = &default_trait_template()[name];
            assert!(*value >= cfg.min() && *value <= cfg.max(), "{name} out of range");
        }
    }

    #[test]
    fn unknown_label_is_neutral_and_windowed() {
        let mut e = engine();
        let before = e.state().clone();
        e.apply_impulse("bafflement", 1.0, true);
        assert_eq!(e.window(), ["neutral"]);
        // Neutral has no impacts; only negligible homeostatic drift.
        for (name, value) in e.state() {
            assert!((value - before[name]).abs() < 1e-3, "{name} moved");
        }
    }

    #[test]
    fn homeostasis_pulls_toward_baseline() {
        // Humor sits in no coupling or catharsis trigger, so nothing can
        // rewrite it mid-convergence.
        let mut e = engine();
        e.state.insert("humor".to_string(), 0.95);
        let mut previous = 0.95 - 0.5;
        for _ in 0..50 {
            e.tick_with(1.0);
            let deviation = (e.state()["humor"] - 0.5).abs();
            assert!(deviation <= previous + 1e-12);
            previous = deviation;
        }
        assert!((e.state()["humor"] - 0.5).abs() < 0.01);
    }

    #[test]
    fn strong_hostility_discharges_through_explosive_anger() {
        let mut e = engine();
        e.apply_impulse("hostility", 1.0, true);
        // Aggression 0.9, tension 0.8, energy 0.6 cross the explosive-anger
        // thresholds in the impulse's own tick; the blowup dumps aggression
        // and leaves the character spent.
        assert!(e.state()["aggression"] < 0.3);
        assert!(e.state()["fatigue"] > 0.7);
    }

    #[test]
    fn repetition_penalty_activates_and_clears() {
        let mut e = engine();
        for _ in 0..3 {
            e.apply_impulse("praise", 0.5, true);
        }
        assert!(e.penalty_active());
        e.apply_impulse("curiosity", 0.5, true);
        assert!(!e.penalty_active());
    }

    #[test]
    fn window_is_bounded() {
        let mut e = engine();
        for _ in 0..8 {
            e.apply_impulse("levity", 0.3, true);
        }
        assert_eq!(e.window().len(), 5);
    }

    #[test]
    fn assistant_impulses_skip_the_window() {
        let mut e = engine();
        for _ in 0..4 {
            e.apply_impulse("praise", 0.25, false);
        }
        assert!(e.window().is_empty());
        assert!(!e.penalty_active());
    }

    #[test]
    fn penalty_dampens_warmth_on_every_impulse() {
        let mut e = engine();
        for _ in 0..3 {
            e.apply_impulse("levity", 0.2, true);
        }
        assert!(e.penalty_active());
        let humor_before = e.state()["humor"];
        e.apply_impulse("levity", 0.2, true);
        // levity adds +0.06*0.2 = 0.012 to humor; the penalty takes 0.1.
        assert!(e.state()["humor"] < humor_before);
    }

    #[test]
    fn catharsis_note_lasts_two_renders() {
        let mut e = engine();
        // Force a paranoid breakdown.
        e.state.insert("paranoia".to_string(), 0.95);
        e.state.insert("tension".to_string(), 0.9);
        e.tick_with(0.0);
        assert!((e.state()["trust"]).abs() < f64::EPSILON);

        let first = e.render_prompt_fragment();
        assert!(first.contains("paranoid breakdown"));
        let second = e.render_prompt_fragment();
        assert!(second.contains("paranoid breakdown"));
        let third = e.render_prompt_fragment();
        assert!(!third.contains("paranoid breakdown"));
    }

    #[test]
    fn calm_engine_renders_empty_fragment() {
        let mut e = engine();
        assert_eq!(e.render_prompt_fragment(), "");
    }

    #[test]
    fn fragment_carries_closing_instruction() {
        let mut e = engine();
        e.apply_impulse("betrayal", 1.0, true);
        let fragment = e.render_prompt_fragment();
        assert!(fragment.ends_with("in your response."));
        assert!(fragment.contains("UNDERLYING TRAITS"));
    }

    #[test]
    fn betrayal_scenario_couples_into_paranoia() {
        let mut e = engine();
        e.apply_impulse("betrayal", 0.5, true);
        assert!(e.state()["trust"] < 0.2);
        assert!(e.state()["grudge"] > 0.7);
        let paranoia = e.state()["paranoia"];
        e.tick_with(1.0);
        // Broken trust lets the grudge feed paranoia faster than homeostasis
        // can drain it.
        assert!(e.state()["paranoia"] > paranoia);
    }

    #[test]
    fn round_trip_through_parts() {
        let mut e = engine();
        e.apply_impulse("criticism", 0.8, true);
        let config = default_trait_template();
        let (state, window, penalty) = e.into_parts();
        let restored = AffectEngine::from_parts(
            config,
            EngineConfig::default(),
            state.clone(),
            window.clone(),
            penalty,
        );
        assert_eq!(restored.state(), &state);
        assert_eq!(restored.window(), window);
    }
}
