//! Request and response types for LLM calls.

use serde::Serialize;

/// Which configured model a request should run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    /// The main model: task generation, description rewrites.
    Main,
    /// The small support model: sentiment and event classification.
    Support,
}

/// A request to the LLM.
#[derive(Debug, Clone, Serialize)]
pub struct LlmRequest {
    /// System prompt (function framing, rules, constraints).
    pub system: String,
    /// User prompt (the content to operate on).
    pub user: String,
    /// Which configured model to use.
    pub role: ModelRole,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic).
    pub temperature: f32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl LlmRequest {
    /// A short, deterministic support-model request.
    #[must_use]
    pub fn support(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            role: ModelRole::Support,
            max_tokens: 60,
            temperature: 0.2,
            timeout_ms: 5000,
        }
    }

    /// A main-model request with room for prose.
    #[must_use]
    pub fn main(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            role: ModelRole::Main,
            max_tokens: 300,
            temperature: 0.7,
            timeout_ms: 5000,
        }
    }

    /// Override the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// A response from the LLM.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The generated text.
    pub text: String,
    /// How many tokens were generated, when the backend reports it.
    pub tokens_generated: u32,
    /// Wall-clock latency in milliseconds.
    pub latency_ms: u64,
    /// Which model served the request.
    pub model: String,
}
