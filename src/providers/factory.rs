// Provider factory
//
// Creates protocol adapters from live provider configurations

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::claude::ClaudeProvider;
use super::openai::OpenAIProvider;
use super::registry::ProviderRegistry;
use super::LlmProvider;
use crate::config::{ProviderConfig, ProviderKind};

/// Create the adapter for one provider config.
pub fn create_provider(config: &ProviderConfig, timeout: Duration) -> Result<Arc<dyn LlmProvider>> {
    match config.kind {
        ProviderKind::Anthropic => Ok(Arc::new(ClaudeProvider::new(config.clone(), timeout)?)),
        // Gemini is reached through its OpenAI-compatible endpoint
        ProviderKind::Gemini | ProviderKind::Openai => {
            Ok(Arc::new(OpenAIProvider::new(config.clone(), timeout)?))
        }
    }
}

/// Create one adapter per live provider in the registry.
pub fn create_providers(
    registry: &ProviderRegistry,
    timeout: Duration,
) -> Result<HashMap<ProviderKind, Arc<dyn LlmProvider>>> {
    let mut adapters = HashMap::new();
    for config in registry.configs() {
        adapters.insert(config.kind, create_provider(config, timeout)?);
    }
    Ok(adapters)
}
