//! Deferred effect processor.
//!
//! Drains a conversation's effect queue and applies each effect to the
//! record, then writes the record back in one save. Holds the conversation's
//! async lock for the whole drain so two batches never interleave.
//!
//! Failure policy: the queue pop is atomic, so effects are handed out at
//! most once. A collaborator failure degrades per its contract and an
//! individual effect failure is logged without aborting the batch; only
//! store-level failures (load, pop, final save) surface to the caller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collaborators::{EventDetector, LocationRewriter, SentimentClassifier, TaskGenerator};
use crate::config::{EngineConfig, TaskConfig};
use crate::effects::{dialogue_context, Effect};
use crate::engine::AffectEngine;
use crate::error::{OrreryError, Result};
use crate::locks::ConversationLocks;
use crate::store::{ConversationRecord, ConversationStore};
use crate::task::TaskController;
use crate::types::{ConversationId, GridCoords, Role, SentimentReading};

/// Applies queued effects to conversation records.
pub struct EffectProcessor<C, G, D, R> {
    store: Arc<ConversationStore>,
    locks: Arc<ConversationLocks>,
    classifier: C,
    generator: G,
    detector: D,
    rewriter: R,
    engine_cfg: EngineConfig,
    task_cfg: TaskConfig,
}

impl<C, G, D, R> EffectProcessor<C, G, D, R>
where
    C: SentimentClassifier,
    G: TaskGenerator,
    D: EventDetector,
    R: LocationRewriter,
{
    /// Wire up a processor.
    pub fn new(
        store: Arc<ConversationStore>,
        locks: Arc<ConversationLocks>,
        classifier: C,
        generator: G,
        detector: D,
        rewriter: R,
        engine_cfg: EngineConfig,
        task_cfg: TaskConfig,
    ) -> Self {
        Self {
            store,
            locks,
            classifier,
            generator,
            detector,
            rewriter,
            engine_cfg,
            task_cfg,
        }
    }

    /// Drain and apply every queued effect for a conversation.
    ///
    /// Returns the up-to-date record. An empty queue returns the stored
    /// record unchanged without a save.
    ///
    /// # Errors
    ///
    /// Returns [`OrreryError::ConversationNotFound`] if the record does not
    /// exist, and store errors from the pop or the final save.
    pub async fn process(&self, id: ConversationId) -> Result<ConversationRecord> {
        let lock = self.locks.acquire(id);
        let _guard = lock.lock().await;

        let mut record = self
            .store
            .load(id)?
            .ok_or(OrreryError::ConversationNotFound(id))?;
        let effects = self.store.pop_effects(id)?;
        if effects.is_empty() {
            return Ok(record);
        }
        let count = effects.len();

        let mut engine = AffectEngine::from_parts(
            record.trait_config.clone(),
            self.engine_cfg,
            record.personality_state.clone(),
            record.recent_user_sentiments.clone(),
            record.repetitive_sentiment_penalty_active,
        );
        let mut controller =
            TaskController::new(record.task.clone(), self.task_cfg.reevaluation_threshold);

        for effect in effects {
            if let Err(error) = self
                .apply_effect(&mut record, &mut engine, &mut controller, effect)
                .await
            {
                warn!(conversation = %id, %error, "effect failed, continuing batch");
            }
        }

        let (state, window, penalty) = engine.into_parts();
        record.personality_state = state;
        record.recent_user_sentiments = window;
        record.repetitive_sentiment_penalty_active = penalty;
        record.task = controller.into_state();
        self.store.save(&record)?;

        info!(conversation = %id, count, "effect batch applied");
        Ok(record)
    }

    /// Delete a conversation and retire its processing lock.
    ///
    /// Takes the conversation's lock first so an in-flight drain finishes
    /// before the rows disappear.
    ///
    /// # Errors
    ///
    /// Returns store errors from the delete.
    pub async fn delete_conversation(&self, id: ConversationId) -> Result<()> {
        let lock = self.locks.acquire(id);
        let _guard = lock.lock().await;
        self.store.delete(id)?;
        self.locks.release(id);
        info!(conversation = %id, "conversation deleted");
        Ok(())
    }

    async fn apply_effect(
        &self,
        record: &mut ConversationRecord,
        engine: &mut AffectEngine,
        controller: &mut TaskController,
        effect: Effect,
    ) -> Result<()> {
        match effect {
            Effect::UserSentiment { message } => {
                let reading = self.classify_or_neutral(&message, Role::User).await;
                engine.apply_impulse(&reading.label, reading.intensity, true);
            }
            Effect::AssistantSentiment { message } => {
                let reading = self.classify_or_neutral(&message, Role::Assistant).await;
                engine.apply_impulse(
                    &reading.label,
                    reading.intensity * self.engine_cfg.assistant_intensity_scale,
                    false,
                );
            }
            Effect::TaskUpdate { messages } => {
                if controller.advance_turn() {
                    self.reevaluate_task(controller, &messages).await;
                }
            }
            Effect::EnvironmentalRewrite { coords } => {
                self.maybe_rewrite_location(record, coords).await?;
            }
            Effect::Unknown => {
                warn!(conversation = %record.id, "unknown effect kind skipped");
            }
        }
        Ok(())
    }

    async fn classify_or_neutral(&self, text: &str, role: Role) -> SentimentReading {
        match self.classifier.classify(text, role).await {
            Ok(reading) => reading,
            Err(error) => {
                warn!(%role, %error, "sentiment classification failed, using neutral");
                SentimentReading::neutral()
            }
        }
    }

    async fn reevaluate_task(
        &self,
        controller: &mut TaskController,
        messages: &[crate::types::Message],
    ) {
        if controller.needs_generation() {
            match self.generator.generate(controller.state(), messages).await {
                Ok(draft) => {
                    if let Err(error) = controller.apply_draft(draft) {
                        warn!(%error, "generated task rejected, keeping prior state");
                    }
                }
                Err(error) => {
                    warn!(%error, "task generation failed, keeping prior state");
                }
            }
        } else {
            controller.apply_increment();
        }
    }

    async fn maybe_rewrite_location(
        &self,
        record: &ConversationRecord,
        coords: GridCoords,
    ) -> Result<()> {
        let context = dialogue_context(&record.messages);
        let event = match self.detector.detect(&context).await {
            Ok(event) => event,
            Err(error) => {
                warn!(%error, "event detection failed, skipping rewrite");
                None
            }
        };
        let Some(event) = event else {
            debug!(%coords, "no notable event, location unchanged");
            return Ok(());
        };

        let original = self
            .store
            .location_description(record.id, coords)?
            .unwrap_or_default();
        match self.rewriter.rewrite(&original, &event, coords).await {
            Ok(description) => {
                self.store
                    .save_location_description(record.id, coords, &description)?;
                info!(%coords, %event, "location description rewritten");
            }
            Err(error) => {
                warn!(%coords, %error, "rewrite failed, keeping original description");
            }
        }
        Ok(())
    }
}
