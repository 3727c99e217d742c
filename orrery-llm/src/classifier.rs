//! LLM-backed sentiment classifier.

use std::sync::Arc;

use tracing::{debug, warn};

use orrery_core::collaborators::SentimentClassifier;
use orrery_core::{Result, Role, SentimentReading};

use crate::client::LlmClient;
use crate::prompt;
use crate::types::LlmRequest;

/// Classifies messages with the configured support model.
///
/// This classifier never fails the caller: transport errors and unparseable
/// responses both degrade to the neutral reading, per the collaborator
/// contract.
pub struct LlmSentimentClassifier {
    client: Arc<LlmClient>,
}

impl LlmSentimentClassifier {
    /// Wrap a shared client.
    #[must_use]
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }
}

impl SentimentClassifier for LlmSentimentClassifier {
    async fn classify(&self, text: &str, role: Role) -> Result<SentimentReading> {
        let request = LlmRequest::support(prompt::sentiment_system(role), prompt::sentiment_user(text))
            .with_timeout(self.client.default_timeout_ms());

        let response = match self.client.generate(&request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%role, %error, "sentiment call failed, degrading to neutral");
                return Ok(SentimentReading::neutral());
            }
        };

        match prompt::parse_sentiment(&response.text) {
            Some((label, intensity)) => {
                debug!(%role, %label, intensity, "sentiment classified");
                Ok(SentimentReading::new(label, intensity))
            }
            None => {
                warn!(
                    %role,
                    raw = %response.text,
                    "unparseable sentiment response, degrading to neutral"
                );
                Ok(SentimentReading::neutral())
            }
        }
    }
}
