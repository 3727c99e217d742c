//! # orrery-llm
//!
//! LLM-backed implementations of the `orrery-core` collaborator traits:
//! sentiment classification, task generation, event detection, and location
//! rewrites. Supports Ollama and OpenAI-compatible backends with a
//! main/support model split — cheap classification goes to the small model,
//! prose generation to the large one.
//!
//! Every implementation degrades the way its trait contract demands, so a
//! dead backend slows nothing and breaks nothing.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classifier;
pub mod client;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod types;
pub mod world;

pub use classifier::LlmSentimentClassifier;
pub use client::{LlmClient, LlmProvider};
pub use error::LlmError;
pub use generator::LlmTaskGenerator;
pub use types::{LlmRequest, LlmResponse, ModelRole};
pub use world::{ChroniclerEventDetector, WorldEditorRewriter};
