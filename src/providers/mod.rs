// Multi-provider LLM support
//
// One completion capability implemented per vendor protocol. Callers go
// through TextCompletionClient and never see vendor request/response shapes.

use async_trait::async_trait;

pub mod types;

// Protocol adapters
pub mod claude;
pub mod openai;
pub mod scripted;

pub mod client;
pub mod factory;
pub mod registry;

pub use client::TextCompletionClient;
pub use factory::{create_provider, create_providers};
pub use registry::{CostEstimate, ProviderRegistry};
pub use scripted::ScriptedProvider;
pub use types::{CompletionRequest, ProviderError, RawCompletion, TokenUsage};

use crate::config::ProviderKind;

/// Trait for LLM providers
///
/// Every vendor adapter implements this single capability: a system prompt,
/// a user prompt, a token budget and a temperature in, completion text out.
/// Adding a provider means adding an implementation, not touching callers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one request and wait for the complete response
    async fn complete(&self, request: &CompletionRequest) -> Result<RawCompletion, ProviderError>;

    /// Which provider kind this adapter speaks for
    fn kind(&self) -> ProviderKind;

    /// Model identifier sent with each request
    fn model(&self) -> &str;

    /// Provider name for logs (e.g. "anthropic")
    fn name(&self) -> &str {
        self.kind().as_str()
    }
}
