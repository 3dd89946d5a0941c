// OpenAI-compatible provider
//
// Serves both OpenAI itself and Gemini through Google's OpenAI-compatible
// endpoint, since they accept the same chat completions format.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{CompletionRequest, ProviderError, RawCompletion, TokenUsage};
use super::LlmProvider;
use crate::config::{ProviderConfig, ProviderKind};

#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAIProvider {
    pub fn new(config: ProviderConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint)
    }

    fn to_openai_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);

        // System prompt travels as the first message (OpenAI convention)
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<RawCompletion, ProviderError> {
        let body = self.to_openai_request(request);
        tracing::debug!("Sending request to {} API: {:?}", self.config.kind, body);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        tracing::debug!("Received {} response: {:?}", self.config.kind, reply);

        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".to_string()))?;

        let text = choice.message.content.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let usage = reply
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(RawCompletion {
            provider: self.config.kind,
            model: reply.model.unwrap_or_else(|| self.config.model.clone()),
            text,
            usage,
            cost: self
                .config
                .estimate_cost(usage.input_tokens, usage.output_tokens),
        })
    }

    fn kind(&self) -> ProviderKind {
        self.config.kind
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}
