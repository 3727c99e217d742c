//! LLM client — unified interface for Ollama and OpenAI-compatible backends.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use orrery_core::LlmConfig;

use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse, ModelRole};

/// Provider backend for LLM inference.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Ollama running locally.
    Ollama {
        /// Base URL, e.g. `http://localhost:11434`.
        base_url: String,
    },
    /// OpenAI-compatible chat-completions API.
    OpenAiCompatible {
        /// Base URL of the API.
        base_url: String,
        /// Bearer token.
        api_key: String,
    },
    /// No LLM available; every call errors and callers degrade.
    None,
}

/// Routes requests to the configured backend and model.
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    main_model: String,
    support_model: String,
    max_retries: u32,
    default_timeout_ms: u64,
}

impl LlmClient {
    /// Create a client.
    #[must_use]
    pub fn new(
        provider: LlmProvider,
        main_model: impl Into<String>,
        support_model: impl Into<String>,
        max_retries: u32,
    ) -> Self {
        Self {
            provider,
            http: Client::new(),
            main_model: main_model.into(),
            support_model: support_model.into(),
            max_retries,
            default_timeout_ms: 5000,
        }
    }

    /// Build a client from an [`LlmConfig`] section.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] for an unrecognized provider name.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let provider = match config.provider.as_str() {
            "ollama" => LlmProvider::Ollama {
                base_url: config.base_url.clone(),
            },
            "openai" => LlmProvider::OpenAiCompatible {
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
            },
            "none" => LlmProvider::None,
            other => {
                return Err(LlmError::ConfigError(format!(
                    "unknown LLM provider '{other}'"
                )));
            }
        };
        Ok(Self {
            provider,
            http: Client::new(),
            main_model: config.model.clone(),
            support_model: config.support_model.clone(),
            max_retries: config.max_retries,
            default_timeout_ms: config.request_timeout_ms,
        })
    }

    /// Create a client with no backend; every call fails fast.
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, "", "", 0)
    }

    /// Is a backend configured?
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }

    /// Default request timeout from configuration.
    #[must_use]
    pub fn default_timeout_ms(&self) -> u64 {
        self.default_timeout_ms
    }

    fn model_for(&self, role: ModelRole) -> &str {
        match role {
            ModelRole::Main => &self.main_model,
            ModelRole::Support => &self.support_model,
        }
    }

    /// Generate a response.
    ///
    /// # Errors
    ///
    /// Returns an error when no backend is configured or all retries fail;
    /// callers degrade per their collaborator contract.
    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("no LLM provider configured".into())),
            LlmProvider::Ollama { base_url } => self.generate_ollama(base_url, request).await,
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                self.generate_openai(base_url, api_key, request).await
            }
        }
    }

    async fn generate_ollama(
        &self,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse, LlmError> {
        let model = self.model_for(request.role);
        let url = format!("{base_url}/api/generate");
        let body = json!({
            "model": model,
            "prompt": format!("{}\n\n{}", request.system, request.user),
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            }
        });

        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt, max = self.max_retries, "retrying LLM call");
            }

            let start = Instant::now();
            let result = self
                .http
                .post(&url)
                .json(&body)
                .timeout(Duration::from_millis(request.timeout_ms))
                .send()
                .await;
            #[allow(clippy::cast_possible_truncation)]
            let latency_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let json: serde_json::Value = resp
                        .json()
                        .await
                        .map_err(|e| LlmError::ParseError(e.to_string()))?;
                    let text = json["response"].as_str().unwrap_or("").to_string();
                    #[allow(clippy::cast_possible_truncation)]
                    let tokens_generated = json["eval_count"].as_u64().unwrap_or(0) as u32;
                    return Ok(LlmResponse {
                        text,
                        tokens_generated,
                        latency_ms,
                        model: model.to_string(),
                    });
                }
                Ok(resp) => {
                    last_error = format!("HTTP {}", resp.status());
                    warn!(error = %last_error, "Ollama returned error status");
                }
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() {
                        warn!(timeout_ms = request.timeout_ms, "Ollama request timed out");
                    } else {
                        warn!(error = %last_error, "Ollama request failed");
                    }
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }

    async fn generate_openai(
        &self,
        base_url: &str,
        api_key: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse, LlmError> {
        let model = self.model_for(request.role);
        let url = format!("{base_url}/v1/chat/completions");
        let body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(attempt, max = self.max_retries, "retrying LLM call");
            }

            let start = Instant::now();
            let result = self
                .http
                .post(&url)
                .header("Authorization", format!("Bearer {api_key}"))
                .json(&body)
                .timeout(Duration::from_millis(request.timeout_ms))
                .send()
                .await;
            #[allow(clippy::cast_possible_truncation)]
            let latency_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let json: serde_json::Value = resp
                        .json()
                        .await
                        .map_err(|e| LlmError::ParseError(e.to_string()))?;
                    let text = json["choices"][0]["message"]["content"]
                        .as_str()
                        .unwrap_or("")
                        .to_string();
                    #[allow(clippy::cast_possible_truncation)]
                    let tokens_generated =
                        json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32;
                    return Ok(LlmResponse {
                        text,
                        tokens_generated,
                        latency_ms,
                        model: model.to_string(),
                    });
                }
                Ok(resp) => {
                    last_error = format!("HTTP {}", resp.status());
                    warn!(error = %last_error, "chat-completions API returned error status");
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(error = %last_error, "chat-completions request failed");
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }

    /// Parse a raw response as structured JSON, tolerating code fences.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ParseError`] when the text is not valid JSON of
    /// the expected shape.
    pub fn parse_structured<T: serde::de::DeserializeOwned>(
        response: &LlmResponse,
    ) -> Result<T, LlmError> {
        let text = strip_code_fences(&response.text);
        serde_json::from_str(text).map_err(|e| {
            LlmError::ParseError(format!("JSON parse error: {e} — raw text: '{}'", response.text))
        })
    }
}

/// Strip a leading/trailing Markdown code fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn none_provider_fails_fast() {
        let client = LlmClient::none();
        assert!(!client.is_available());
        let request = LlmRequest::support("system", "user");
        assert!(matches!(
            client.generate(&request).await,
            Err(LlmError::Unavailable(_))
        ));
    }

    #[test]
    fn from_config_rejects_unknown_provider() {
        let mut config = LlmConfig::default();
        config.provider = "carrier-pigeon".to_string();
        assert!(matches!(
            LlmClient::from_config(&config),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn structured_parse_tolerates_fences() {
        let response = LlmResponse {
            text: "```json\n{\"task\": \"rest\", \"progress\": 0.0, \"priority\": \"easy\"}\n```"
                .into(),
            tokens_generated: 0,
            latency_ms: 0,
            model: "test".into(),
        };
        let value: serde_json::Value =
            LlmClient::parse_structured(&response).expect("fenced JSON parses");
        assert_eq!(value["task"], "rest");
    }
}
