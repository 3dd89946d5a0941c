// Unified request/response types for multi-provider completion
//
// Adapters translate CompletionRequest into their vendor format and translate
// the vendor reply back into RawCompletion.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProviderKind;

/// One single-turn completion request, provider agnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System prompt (sent as `system` for Claude, as a system message for OpenAI-compatible APIs)
    pub system: Option<String>,

    /// The user turn
    pub prompt: String,

    pub max_tokens: u32,

    /// 0.0 to 2.0
    pub temperature: f32,

    /// Free-form label recorded in the usage log ("card", "topics", ...)
    pub purpose: String,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.7,
            purpose: "completion".to_string(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }
}

/// Token usage reported by the vendor (zero when the vendor omits it)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A completed call: provider used, model, text, usage and cost estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCompletion {
    pub provider: ProviderKind,
    pub model: String,
    pub text: String,
    pub usage: TokenUsage,
    /// Estimated USD, from the provider's configured per-1k pricing
    pub cost: f64,
}

/// Adapter-level failure.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API request failed\n\nStatus: {status}\nBody: {body}")]
    Http { status: u16, body: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider returned an empty completion")]
    EmptyResponse,
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// 401/403 from the vendor
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status == 401 || *status == 403)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}
