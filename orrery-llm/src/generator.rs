//! LLM-backed task generator.

use std::sync::Arc;

use tracing::debug;

use orrery_core::collaborators::TaskGenerator;
use orrery_core::{Message, Result, TaskDraft, TaskState};

use crate::client::LlmClient;
use crate::prompt;
use crate::types::LlmRequest;

/// Generates task drafts with the configured main model.
///
/// Unlike the classifier this propagates failures: the processor keeps the
/// prior task state when generation errors, so a hard `Err` is the correct
/// degradation here.
pub struct LlmTaskGenerator {
    client: Arc<LlmClient>,
}

impl LlmTaskGenerator {
    /// Wrap a shared client.
    #[must_use]
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }
}

impl TaskGenerator for LlmTaskGenerator {
    async fn generate(&self, prior: &TaskState, recent: &[Message]) -> Result<TaskDraft> {
        let request = LlmRequest::main(
            prompt::task_controller_system(prior, recent),
            "Return the JSON object now.",
        )
        .with_timeout(self.client.default_timeout_ms());

        let response = self.client.generate(&request).await?;
        let draft: TaskDraft = LlmClient::parse_structured(&response)?;
        debug!(task = %draft.task, ?draft.priority, "task draft generated");
        Ok(draft)
    }
}
