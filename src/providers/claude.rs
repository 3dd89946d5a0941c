// Claude provider (Anthropic native messages API)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{CompletionRequest, ProviderError, RawCompletion, TokenUsage};
use super::LlmProvider;
use crate::config::{ProviderConfig, ProviderKind};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeProvider {
    client: Client,
    config: ProviderConfig,
}

impl ClaudeProvider {
    pub fn new(config: ProviderConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.config.endpoint)
    }

    fn to_claude_request(&self, request: &CompletionRequest) -> MessagesRequest {
        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: request.max_tokens,
            system: request.system.clone(),
            temperature: request.temperature,
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        }
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<RawCompletion, ProviderError> {
        let body = self.to_claude_request(request);
        tracing::debug!("Sending request to Claude API: {:?}", body);

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        tracing::debug!("Received Claude response: {:?}", reply);

        let text = reply
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let usage = reply
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            })
            .unwrap_or_default();

        Ok(RawCompletion {
            provider: ProviderKind::Anthropic,
            model: reply.model.unwrap_or_else(|| self.config.model.clone()),
            text,
            usage,
            cost: self
                .config
                .estimate_cost(usage.input_tokens, usage.output_tokens),
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

// Claude API wire types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}
