// Text completion client
//
// Single-attempt completion primitive over every live provider. Picks the
// adapter through the registry, bounds the call with a timeout, and maps
// adapter failures into the crate error taxonomy. Never retries and never
// switches to another provider after a failed call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::factory::create_providers;
use super::registry::ProviderRegistry;
use super::types::{CompletionRequest, RawCompletion};
use super::LlmProvider;
use crate::config::ProviderKind;
use crate::errors::{Error, Result, ValidationError};
use crate::logging::{UsageEntry, UsageLogger};

pub struct TextCompletionClient {
    registry: Arc<ProviderRegistry>,
    adapters: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
    timeout: Duration,
    usage_log: Option<Arc<UsageLogger>>,
}

impl TextCompletionClient {
    /// Client with no adapters; attach them with `with_adapter`.
    pub fn new(registry: Arc<ProviderRegistry>, timeout: Duration) -> Self {
        Self {
            registry,
            adapters: HashMap::new(),
            timeout,
            usage_log: None,
        }
    }

    /// Client with one HTTP adapter per live provider.
    pub fn from_registry(registry: Arc<ProviderRegistry>, timeout: Duration) -> anyhow::Result<Self> {
        let adapters = create_providers(&registry, timeout)?;
        Ok(Self {
            adapters,
            ..Self::new(registry, timeout)
        })
    }

    /// Register (or replace) the adapter for its provider kind.
    pub fn with_adapter(mut self, adapter: Arc<dyn LlmProvider>) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    pub fn with_usage_log(mut self, logger: Arc<UsageLogger>) -> Self {
        self.usage_log = Some(logger);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Pick the provider for a call (default when absent, default with a warning when not live).
    pub fn resolve_provider(&self, provider: Option<ProviderKind>) -> Result<ProviderKind> {
        self.registry.resolve(provider)
    }

    /// Complete a prompt and return only the text.
    pub async fn complete(
        &self,
        system_prompt: Option<&str>,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
        provider: Option<ProviderKind>,
    ) -> Result<String> {
        let mut request = CompletionRequest::new(user_prompt)
            .with_max_tokens(max_tokens)
            .with_temperature(temperature);
        if let Some(system) = system_prompt {
            request = request.with_system(system);
        }

        self.complete_raw(&request, provider)
            .await
            .map(|completion| completion.text)
    }

    /// Complete a request and return text, usage and cost.
    pub async fn complete_raw(
        &self,
        request: &CompletionRequest,
        provider: Option<ProviderKind>,
    ) -> Result<RawCompletion> {
        if !(0.0..=2.0).contains(&request.temperature) {
            return Err(ValidationError::TemperatureOutOfRange(request.temperature).into());
        }
        if request.max_tokens == 0 {
            return Err(ValidationError::ZeroMaxTokens.into());
        }

        let kind = self.resolve_provider(provider)?;
        let adapter = self.adapters.get(&kind).ok_or_else(|| {
            Error::Configuration(format!("No adapter registered for provider {}", kind))
        })?;

        tracing::debug!(
            "Completion via {} ({}), purpose={}, max_tokens={}",
            kind,
            adapter.model(),
            request.purpose,
            request.max_tokens
        );

        let completion = match tokio::time::timeout(self.timeout, adapter.complete(request)).await {
            Err(_) => {
                return Err(Error::Timeout {
                    provider: kind,
                    seconds: self.timeout.as_secs(),
                })
            }
            Ok(Err(source)) if source.is_timeout() => {
                return Err(Error::Timeout {
                    provider: kind,
                    seconds: self.timeout.as_secs(),
                })
            }
            Ok(Err(source)) => {
                return Err(Error::Generation {
                    provider: kind,
                    source,
                })
            }
            Ok(Ok(completion)) => completion,
        };

        if let Some(logger) = &self.usage_log {
            let entry = UsageEntry::from_completion(&completion, &request.purpose);
            if let Err(e) = logger.log(&entry) {
                tracing::warn!("Failed to record usage: {:#}", e);
            }
        }

        Ok(completion)
    }
}
