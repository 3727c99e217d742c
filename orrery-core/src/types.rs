//! Core type definitions for the orrery affect system.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Unique identifier for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    /// Create a new random conversation ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human participant.
    User,
    /// The character / model participant.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a conversation's history.
///
/// The core reads slices of the history (for task generation and
/// environmental-rewrite context) but does not otherwise own it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who said it.
    pub role: Role,
    /// What was said.
    pub content: String,
}

impl Message {
    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// Grid coordinates of a world location.
///
/// The map itself lives outside this core; coordinates only key the
/// location-description contract used by environmental rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoords {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl fmt::Display for GridCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Immutable per-trait parameters, fixed at conversation creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitConfig {
    /// Resting value the trait is pulled back toward.
    pub baseline: f64,
    /// Inclusive `[min, max]` bounds for the trait value.
    pub range: [f64; 2],
    /// How strongly the trait snaps back toward baseline.
    pub elasticity: f64,
    /// Passive drift rate toward baseline.
    pub decay: f64,
}

impl TraitConfig {
    /// Lower bound of the valid range.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.range[0]
    }

    /// Upper bound of the valid range.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.range[1]
    }

    /// Clamp a value into this trait's range.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.range[0], self.range[1])
    }

    /// Check the `min ≤ baseline ≤ max`, `elasticity ≥ 0`, `decay ≥ 0`
    /// invariants.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason on the first violated invariant.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.range[0] > self.range[1] {
            return Err(format!(
                "range min {} exceeds max {}",
                self.range[0], self.range[1]
            ));
        }
        if self.baseline < self.range[0] || self.baseline > self.range[1] {
            return Err(format!(
                "baseline {} outside range [{}, {}]",
                self.baseline, self.range[0], self.range[1]
            ));
        }
        if self.elasticity < 0.0 {
            return Err(format!("elasticity {} is negative", self.elasticity));
        }
        if self.decay < 0.0 {
            return Err(format!("decay {} is negative", self.decay));
        }
        Ok(())
    }
}

impl Default for TraitConfig {
    fn default() -> Self {
        Self {
            baseline: 0.5,
            range: [0.0, 1.0],
            elasticity: 0.1,
            decay: 0.05,
        }
    }
}

/// Per-conversation trait configuration document: trait name → parameters.
pub type TraitConfigMap = BTreeMap<String, TraitConfig>;

/// Current trait-value vector: trait name → value.
pub type AffectState = BTreeMap<String, f64>;

/// Build the initial affect state from a config map: every trait at its
/// baseline.
#[must_use]
pub fn baseline_state(config: &TraitConfigMap) -> AffectState {
    config
        .iter()
        .map(|(name, cfg)| (name.clone(), cfg.baseline))
        .collect()
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// Output of the sentiment classifier: a label from the closed vocabulary
/// and an intensity in `[0.1, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    /// Sentiment label. Unknown labels are coerced to neutral downstream.
    pub label: String,
    /// Strength of the sentiment, clamped to `[0.1, 1.0]`.
    pub intensity: f64,
}

impl SentimentReading {
    /// Create a reading, clamping intensity into `[0.1, 1.0]`.
    #[must_use]
    pub fn new(label: impl Into<String>, intensity: f64) -> Self {
        Self {
            label: label.into(),
            intensity: intensity.clamp(0.1, 1.0),
        }
    }

    /// The degraded fallback reading used when classification fails.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            label: "neutral".to_string(),
            intensity: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Mood color
// ---------------------------------------------------------------------------

/// An RGBA color summarizing the character's current mood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity, capped at 0.7.
    pub alpha: f64,
}

impl MoodColor {
    /// The faint neutral gray returned when total deviation is negligible.
    pub const NEUTRAL: Self = Self {
        r: 128,
        g: 128,
        b: 128,
        alpha: 0.1,
    };
}
