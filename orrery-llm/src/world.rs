//! World chronicler and editor: event detection and location rewrites.

use std::sync::Arc;

use tracing::{debug, warn};

use orrery_core::collaborators::{EventDetector, LocationRewriter};
use orrery_core::{DialogueContext, GridCoords, OrreryError, Result};

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::prompt;
use crate::types::LlmRequest;

/// Detects world-changing events in recent dialogue using the support model.
///
/// Failures degrade to "no event": a missed rewrite is invisible, a spurious
/// error would stall the whole effect batch.
pub struct ChroniclerEventDetector {
    client: Arc<LlmClient>,
}

impl ChroniclerEventDetector {
    /// Wrap a shared client.
    #[must_use]
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }
}

impl EventDetector for ChroniclerEventDetector {
    async fn detect(&self, context: &DialogueContext) -> Result<Option<String>> {
        if context.user.is_empty() && context.assistant.is_empty() {
            return Ok(None);
        }
        let request = LlmRequest::support(prompt::chronicler_prompt(context), "")
            .with_timeout(self.client.default_timeout_ms());

        match self.client.generate(&request).await {
            Ok(response) => {
                let event = prompt::parse_event(&response.text);
                debug!(event = event.as_deref().unwrap_or("none"), "chronicler verdict");
                Ok(event)
            }
            Err(error) => {
                warn!(%error, "event detection failed, assuming no event");
                Ok(None)
            }
        }
    }
}

/// Rewrites location descriptions with the main model.
///
/// Propagates failures so the caller keeps the original description.
pub struct WorldEditorRewriter {
    client: Arc<LlmClient>,
}

impl WorldEditorRewriter {
    /// Wrap a shared client.
    #[must_use]
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }
}

impl LocationRewriter for WorldEditorRewriter {
    async fn rewrite(&self, original: &str, event: &str, coords: GridCoords) -> Result<String> {
        let request = LlmRequest::main(prompt::editor_prompt(original, event), "")
            .with_timeout(self.client.default_timeout_ms());

        let response = self.client.generate(&request).await?;
        let description = response.text.trim();
        if description.is_empty() {
            return Err(OrreryError::from(LlmError::ParseError(
                "editor returned an empty description".into(),
            )));
        }
        debug!(%coords, "location description rewritten");
        Ok(description.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detector_degrades_to_no_event() {
        let detector = ChroniclerEventDetector::new(Arc::new(LlmClient::none()));
        let context = DialogueContext {
            user: "I smash the altar".into(),
            assistant: "Stone shards scatter across the floor.".into(),
        };
        assert!(detector.detect(&context).await.expect("degrades").is_none());
    }

    #[tokio::test]
    async fn empty_context_skips_the_call() {
        let detector = ChroniclerEventDetector::new(Arc::new(LlmClient::none()));
        assert!(detector
            .detect(&DialogueContext::default())
            .await
            .expect("ok")
            .is_none());
    }

    #[tokio::test]
    async fn rewriter_surfaces_failures() {
        let rewriter = WorldEditorRewriter::new(Arc::new(LlmClient::none()));
        let result = rewriter
            .rewrite("an empty tavern", "Fire burned trees.", GridCoords { x: 1, y: 1 })
            .await;
        assert!(matches!(result, Err(OrreryError::Collaborator(_))));
    }
}
