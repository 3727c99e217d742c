//! Configuration for the orrery affect system.
//!
//! One top-level [`OrreryConfig`] loadable from TOML, with defaulted
//! sub-sections. The trait template is copied into each conversation record
//! at creation; later edits to the template never touch existing
//! conversations.

use serde::{Deserialize, Serialize};

use crate::types::{TraitConfig, TraitConfigMap};

/// Top-level orrery configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrreryConfig {
    /// Affect engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Task controller tuning.
    #[serde(default)]
    pub task: TaskConfig,
    /// LLM collaborator settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Persistence / save settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Per-trait template applied to new conversations.
    #[serde(default = "default_trait_template")]
    pub traits: TraitConfigMap,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            task: TaskConfig::default(),
            llm: LlmConfig::default(),
            persistence: PersistenceConfig::default(),
            traits: default_trait_template(),
        }
    }
}

impl OrreryConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `OrreryError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| crate::OrreryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Validate every trait entry in the template.
    ///
    /// # Errors
    /// Returns `OrreryError::InvalidTraitConfig` naming the first bad trait.
    pub fn validate(&self) -> crate::error::Result<()> {
        for (name, cfg) in &self.traits {
            cfg.validate()
                .map_err(|reason| crate::OrreryError::InvalidTraitConfig {
                    trait_name: name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Affect engine tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Max entries kept in the recent-user-sentiment window.
    #[serde(default = "default_5_usize")]
    pub sentiment_window: usize,
    /// Consecutive identical user sentiments that activate the repetition
    /// penalty.
    #[serde(default = "default_3_usize")]
    pub repeat_threshold: usize,
    /// Magnitude of the per-impulse repetition penalty.
    #[serde(default = "default_0_1")]
    pub repetition_penalty: f64,
    /// Cap on a single tick's elapsed time, in seconds.
    #[serde(default = "default_1_0")]
    pub max_tick_seconds: f64,
    /// Scale applied to assistant-origin impulse intensities.
    #[serde(default = "default_0_25")]
    pub assistant_intensity_scale: f64,
    /// Deviation-from-baseline threshold for complex mental states.
    #[serde(default = "default_0_2")]
    pub mental_state_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sentiment_window: 5,
            repeat_threshold: 3,
            repetition_penalty: 0.1,
            max_tick_seconds: 1.0,
            assistant_intensity_scale: 0.25,
            mental_state_threshold: 0.2,
        }
    }
}

/// Task controller tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Turns between task re-evaluations.
    #[serde(default = "default_2_u32")]
    pub reevaluation_threshold: u32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            reevaluation_threshold: 2,
        }
    }
}

/// LLM collaborator configuration.
///
/// The core never calls an LLM itself; these settings are consumed by the
/// collaborator implementations wired into the effect processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "ollama", "openai", "none".
    #[serde(default = "default_ollama")]
    pub provider: String,
    /// Base URL for the LLM API.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// API key for hosted providers (empty for local).
    #[serde(default)]
    pub api_key: String,
    /// Main model, used for task generation and rewrites.
    #[serde(default = "default_main_model")]
    pub model: String,
    /// Small support model, used for sentiment and event classification.
    #[serde(default = "default_support_model")]
    pub support_model: String,
    /// Hard timeout for any LLM call in milliseconds.
    #[serde(default = "default_5000")]
    pub request_timeout_ms: u64,
    /// Max retries before degrading to the neutral/no-op fallback.
    #[serde(default = "default_1_u32")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            api_key: String::new(),
            model: "mistral:7b-instruct".to_string(),
            support_model: "qwen2.5:1.5b".to_string(),
            request_timeout_ms: 5000,
            max_retries: 1,
        }
    }
}

/// Persistence / save configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Use WAL mode for concurrent reads.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Number of save backups to keep.
    #[serde(default = "default_3_u32")]
    pub backup_count: u32,
    /// Detect save corruption via checksums.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            wal_mode: true,
            backup_count: 3,
            checksum_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Default trait template
// ---------------------------------------------------------------------------

/// Every trait touched by the impact, coupling, catharsis, mental-state, or
/// mood tables. All default to baseline 0.5 on `[0, 1]` with gentle
/// restoration; a deployment overrides per-character values in TOML.
const TRAIT_NAMES: &[&str] = &[
    "aggression",
    "admiration",
    "ambition",
    "analytical",
    "antagonism",
    "autonomy",
    "competitiveness",
    "confidence",
    "confusion",
    "decisiveness",
    "domineering",
    "empathy",
    "energy",
    "excitement",
    "fatigue",
    "fear",
    "grudge",
    "guilt",
    "hope",
    "humor",
    "introversion",
    "joy",
    "mission_driven",
    "moral_violation",
    "openness",
    "paranoia",
    "pride",
    "proactivity",
    "recklessness",
    "respect",
    "rumination",
    "sadness",
    "self_interest",
    "seriousness",
    "skepticism",
    "stubbornness",
    "tension",
    "trust",
    "urgency",
    "vulnerability",
];

/// Build the default trait template.
#[must_use]
pub fn default_trait_template() -> TraitConfigMap {
    TRAIT_NAMES
        .iter()
        .map(|&name| (name.to_string(), TraitConfig::default()))
        .collect()
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}
fn default_ollama() -> String {
    "ollama".to_string()
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_main_model() -> String {
    "mistral:7b-instruct".to_string()
}
fn default_support_model() -> String {
    "qwen2.5:1.5b".to_string()
}
fn default_0_1() -> f64 {
    0.1
}
fn default_0_2() -> f64 {
    0.2
}
fn default_0_25() -> f64 {
    0.25
}
fn default_1_0() -> f64 {
    1.0
}
fn default_1_u32() -> u32 {
    1
}
fn default_2_u32() -> u32 {
    2
}
fn default_3_u32() -> u32 {
    3
}
fn default_3_usize() -> usize {
    3
}
fn default_5_usize() -> usize {
    5
}
fn default_5000() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OrreryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.sentiment_window, 5);
        assert_eq!(config.task.reevaluation_threshold, 2);
    }

    #[test]
    fn template_covers_core_traits() {
        let template = default_trait_template();
        for name in ["trust", "grudge", "paranoia", "fatigue", "energy"] {
            assert!(template.contains_key(name), "template missing {name}");
        }
    }

    #[test]
    fn toml_round_trip_with_overrides() {
        let toml_str = r#"
            [engine]
            sentiment_window = 7

            [traits.trust]
            baseline = 0.7
            range = [0.0, 1.0]
            elasticity = 0.2
            decay = 0.05
        "#;
        let config = OrreryConfig::from_toml(toml_str).expect("parse");
        assert_eq!(config.engine.sentiment_window, 7);
        assert!((config.traits["trust"].baseline - 0.7).abs() < f64::EPSILON);
        // Unlisted sections fall back to defaults.
        assert_eq!(config.task.reevaluation_threshold, 2);
    }

    #[test]
    fn bad_trait_config_is_rejected() {
        let toml_str = r#"
            [traits.trust]
            baseline = 2.0
            range = [0.0, 1.0]
            elasticity = 0.1
            decay = 0.05
        "#;
        assert!(OrreryConfig::from_toml(toml_str).is_err());
    }
}
