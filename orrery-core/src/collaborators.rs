//! Collaborator seams for the effect processor.
//!
//! Each trait wraps one LLM-backed (or otherwise external) capability the
//! processor needs. Implementations live outside this crate; tests use
//! in-memory fakes. Degradation on failure is part of each contract and the
//! processor enforces it: a failing collaborator never fails the batch.

use crate::effects::DialogueContext;
use crate::error::Result;
use crate::task::{TaskDraft, TaskState};
use crate::types::{GridCoords, Message, Role, SentimentReading};

/// Classifies a message into the closed sentiment vocabulary.
///
/// Failures degrade to [`SentimentReading::neutral`] at the call site.
pub trait SentimentClassifier: Send + Sync {
    /// Classify `text`, spoken by `role`.
    fn classify(
        &self,
        text: &str,
        role: Role,
    ) -> impl std::future::Future<Output = Result<SentimentReading>> + Send;
}

/// Proposes the character's next personal task.
///
/// Failures leave the prior task state untouched at the call site.
pub trait TaskGenerator: Send + Sync {
    /// Generate a draft from the prior state and recent conversation.
    fn generate(
        &self,
        prior: &TaskState,
        recent: &[Message],
    ) -> impl std::future::Future<Output = Result<TaskDraft>> + Send;
}

/// Decides whether recent dialogue contains an event worth reflecting in
/// the world.
///
/// Failures degrade to "no event" at the call site.
pub trait EventDetector: Send + Sync {
    /// Return a short event summary, or `None` when nothing notable
    /// happened.
    fn detect(
        &self,
        context: &DialogueContext,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
}

/// Rewrites a location description to reflect an event.
///
/// Failures keep the original description at the call site.
pub trait LocationRewriter: Send + Sync {
    /// Produce the updated description.
    fn rewrite(
        &self,
        original: &str,
        event: &str,
        coords: GridCoords,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}
