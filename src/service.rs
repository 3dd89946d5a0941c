// Content service
//
// Caller-facing API that a CLI or UI binds to. Owns the provider registry,
// completion client and storage handle; built once at startup and passed
// around by reference. Re-initialisation is explicit.

use anyhow::{bail, Context};
use serde::Serialize;
use std::sync::Arc;

use crate::config::constants::ESTIMATED_INPUT_TOKENS_PER_CARD;
use crate::config::constants::ESTIMATED_OUTPUT_TOKENS_PER_CARD;
use crate::config::{Config, Credentials, ProviderKind};
use crate::content::{ContentCard, ContentSet, Creator};
use crate::errors::{Error, Result, ValidationError};
use crate::generation::{self, BatchRequest, BatchResult, GenerationOrchestrator, TopicExtractor};
use crate::logging::UsageLogger;
use crate::providers::{ProviderRegistry, TextCompletionClient};
use crate::storage::{ContentStore, JsonStore};

/// One live provider with its cost hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSummary {
    pub kind: ProviderKind,
    pub display_name: &'static str,
    pub model: String,
    /// Estimated cost of one card at the typical token volume
    pub cost_per_card: f64,
    pub is_default: bool,
    pub is_cheapest: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorStatus {
    pub ready: bool,
    pub providers: Vec<ProviderKind>,
    pub default_provider: Option<ProviderKind>,
}

impl GeneratorStatus {
    pub fn message(&self) -> String {
        if self.ready {
            let names: Vec<&str> = self.providers.iter().map(|p| p.as_str()).collect();
            format!(
                "Ready - {} providers available: {}",
                self.providers.len(),
                names.join(", ")
            )
        } else {
            "Not configured - set a provider API key in the environment".to_string()
        }
    }
}

pub struct ContentService {
    config: Config,
    client: Arc<TextCompletionClient>,
    store: Arc<dyn ContentStore>,
    usage_log: Option<Arc<UsageLogger>>,
}

impl ContentService {
    /// Service over environment credentials and a JSON store in `config.data_dir`.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        let store = JsonStore::open(&config.data_dir)?;
        Self::from_parts(config, &Credentials::from_env(), Arc::new(store))
    }

    pub fn from_parts(
        config: Config,
        credentials: &Credentials,
        store: Arc<dyn ContentStore>,
    ) -> anyhow::Result<Self> {
        let usage_log = if config.usage_log {
            Some(Arc::new(UsageLogger::new(config.usage_dir())?))
        } else {
            None
        };
        let client = build_client(&config, credentials, usage_log.clone())?;
        Ok(Self {
            config,
            client: Arc::new(client),
            store,
            usage_log,
        })
    }

    /// Service over a pre-built client (scripted adapters in tests).
    pub fn with_client(config: Config, client: TextCompletionClient, store: Arc<dyn ContentStore>) -> Self {
        Self {
            config,
            client: Arc::new(client),
            store,
            usage_log: None,
        }
    }

    /// Rebuild registry and client from a fresh credential set.
    pub fn reinitialize(&mut self, credentials: &Credentials) -> anyhow::Result<()> {
        let client = build_client(&self.config, credentials, self.usage_log.clone())?;
        self.client = Arc::new(client);
        tracing::info!("Reinitialized providers: {:?}", self.client.registry().list_available());
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &ProviderRegistry {
        self.client.registry()
    }

    pub fn usage_log(&self) -> Option<&UsageLogger> {
        self.usage_log.as_deref()
    }

    pub fn list_available_providers(&self) -> Vec<ProviderSummary> {
        let registry = self.registry();
        let default = registry.default_provider();
        let cheapest = registry.cheapest();
        registry
            .configs()
            .map(|config| ProviderSummary {
                kind: config.kind,
                display_name: config.kind.display_name(),
                model: config.model.clone(),
                cost_per_card: config
                    .estimate_cost(ESTIMATED_INPUT_TOKENS_PER_CARD, ESTIMATED_OUTPUT_TOKENS_PER_CARD),
                is_default: default == Some(config.kind),
                is_cheapest: cheapest == Some(config.kind),
            })
            .collect()
    }

    pub fn status(&self) -> GeneratorStatus {
        let registry = self.registry();
        GeneratorStatus {
            ready: !registry.is_degraded(),
            providers: registry.list_available(),
            default_provider: registry.default_provider(),
        }
    }

    /// Candidate topics from free text. Empty means extraction failed.
    pub async fn extract_topics(
        &self,
        content: &str,
        guidance: &str,
        creator_label: &str,
        provider: Option<ProviderKind>,
    ) -> Vec<String> {
        let extractor = TopicExtractor::new(self.client.clone()).with_language(self.config.language.clone());
        match extractor.extract(content, guidance, creator_label, provider).await {
            Ok(topics) => topics,
            Err(e) => {
                tracing::warn!("Topic extraction skipped: {}", e);
                Vec::new()
            }
        }
    }

    /// `Err` carries a human-readable reason.
    pub fn validate_topic_batch<S: AsRef<str>>(&self, topics: &[S]) -> std::result::Result<(), String> {
        generation::validate_topic_batch(topics).map_err(|e| e.to_string())
    }

    /// Generate one card per topic for a creator and persist them as a new set.
    ///
    /// The set is stored only when at least one card was produced; its
    /// `card_count` reflects the cards actually stored. A storage failure
    /// after generation does not discard the batch: the result comes back
    /// with `storage_error` set and `stored_set_id` empty.
    pub async fn generate_cards(
        &self,
        creator_label: &str,
        guidance: &str,
        topics: &[String],
        provider: Option<ProviderKind>,
    ) -> Result<BatchResult> {
        let provider = self.client.resolve_provider(provider)?;
        generation::validate_topic_batch(topics)?;

        let creator = self
            .store
            .find_creator(creator_label)
            .map_err(Error::storage)?
            .ok_or_else(|| ValidationError::UnknownCreator(creator_label.trim().to_string()))?;
        let category = creator.primary_category();

        let title = if guidance.trim().is_empty() {
            topics[0].trim()
        } else {
            guidance.trim()
        };
        let mut set = ContentSet::new(&creator.creator_id, title, guidance, category)
            .with_language(&self.config.language);
        set.topics = topics.iter().map(|t| t.trim().to_string()).collect();

        let request = BatchRequest::new(topics.to_vec(), category)
            .with_provider(Some(provider))
            .with_context(guidance)
            .for_set(set.set_id.clone(), creator.creator_id.clone());

        let orchestrator = GenerationOrchestrator::new(self.client.clone())
            .with_language(self.config.language.clone());
        let mut result = orchestrator.generate_cards(&request).await?;

        if result.cards.is_empty() {
            tracing::warn!("No cards generated for '{}'; content set not stored", creator.display_name);
            return Ok(result);
        }

        match self.persist_set(set, &result.cards) {
            Ok(set_id) => result.stored_set_id = Some(set_id),
            Err(e) => {
                let e = Error::storage(e);
                tracing::error!("{} cards generated but not stored: {}", result.cards.len(), e);
                result.storage_error = Some(e.to_string());
            }
        }
        Ok(result)
    }

    /// Cards first, then the set with its final count. A failed card write
    /// leaves no set behind.
    fn persist_set(&self, mut set: ContentSet, cards: &[ContentCard]) -> anyhow::Result<String> {
        let added = self
            .store
            .add_cards(cards)
            .with_context(|| format!("Failed to store cards for content set {}", set.set_id))?;
        if added == 0 {
            bail!("All {} card ids for content set {} already exist", cards.len(), set.set_id);
        }

        set.set_card_count(added as u32);
        let inserted = self
            .store
            .add_content_set(&set)
            .with_context(|| format!("Failed to store content set {}", set.set_id))?;
        if !inserted {
            bail!("Content set id {} already exists", set.set_id);
        }

        tracing::info!("Stored content set {} with {} cards", set.set_id, added);
        Ok(set.set_id)
    }

    /// Store a new creator; `Ok(false)` when the id is taken.
    pub fn register_creator(&self, creator: &Creator) -> Result<bool> {
        self.store.add_creator(creator).map_err(Error::storage)
    }

    pub fn list_creators(&self) -> Result<Vec<Creator>> {
        self.store.list_creators().map_err(Error::storage)
    }

    pub fn find_creator(&self, label: &str) -> Result<Option<Creator>> {
        self.store.find_creator(label).map_err(Error::storage)
    }

    pub fn content_sets(&self, creator_id: &str) -> Result<Vec<ContentSet>> {
        self.store.list_content_sets(creator_id).map_err(Error::storage)
    }

    pub fn cards_for_set(&self, set_id: &str) -> Result<Vec<ContentCard>> {
        self.store.get_cards_by_set(set_id).map_err(Error::storage)
    }
}

fn build_client(
    config: &Config,
    credentials: &Credentials,
    usage_log: Option<Arc<UsageLogger>>,
) -> anyhow::Result<TextCompletionClient> {
    let registry = Arc::new(ProviderRegistry::from_credentials(credentials, &config.providers));
    let client = TextCompletionClient::from_registry(registry, config.request_timeout())
        .context("Failed to build completion client")?;
    Ok(match usage_log {
        Some(logger) => client.with_usage_log(logger),
        None => client,
    })
}
