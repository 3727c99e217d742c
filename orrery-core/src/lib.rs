//! # orrery-core
//!
//! Affective-state simulation for conversational game characters.
//!
//! A character's personality is a vector of trait values pulled toward
//! per-trait baselines by homeostatic restoration and pushed around by
//! sentiment impulses, coupling rules, and cathartic events. Side effects
//! of each conversation turn (sentiment classification, task reevaluation,
//! world rewrites) are queued durably and drained off the hot path by the
//! [`processor::EffectProcessor`].
//!
//! ## Architecture
//!
//! - [`engine`] — the per-conversation affect simulation
//! - [`impact`], [`coupling`], [`catharsis`], [`mental_state`], [`mood`] —
//!   the static rule tables the engine runs on
//! - [`task`] — the character's personal-objective state machine
//! - [`effects`] / [`processor`] — deferred effect records and the drain loop
//! - [`store`] — SQLite persistence for records, queues, and locations
//! - [`collaborators`] — seams for the LLM-backed helpers
//!
//! The core never talks to an LLM itself; everything model-shaped enters
//! through the [`collaborators`] traits.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod catharsis;
pub mod collaborators;
pub mod config;
pub mod coupling;
pub mod effects;
pub mod engine;
pub mod error;
pub mod impact;
pub mod locks;
pub mod mental_state;
pub mod mood;
pub mod processor;
pub mod store;
pub mod task;
pub mod types;

pub use config::{EngineConfig, LlmConfig, OrreryConfig, PersistenceConfig, TaskConfig};
pub use effects::{dialogue_context, DialogueContext, Effect};
pub use engine::AffectEngine;
pub use error::{OrreryError, Result};
pub use locks::ConversationLocks;
pub use processor::EffectProcessor;
pub use store::{ConversationRecord, ConversationStore};
pub use task::{Priority, TaskController, TaskDraft, TaskState};
pub use types::{
    baseline_state, AffectState, ConversationId, GridCoords, Message, MoodColor, Role,
    SentimentReading, TraitConfig, TraitConfigMap,
};
