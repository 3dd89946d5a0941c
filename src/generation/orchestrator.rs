// Generation orchestrator
//
// Runs one batch: preconditions, then one completion per topic in order.
// A failed topic is recorded in the ledger and the batch moves on; only a
// precondition failure (bad topic batch, no live provider) aborts.

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::parser::{CardParser, LabeledCardParser};
use super::prompts::{GenerationRequest, CARD_SYSTEM_PROMPT};
use super::topics::TopicExtractor;
use super::validation::validate_topic_batch;
use crate::config::constants::{CARD_MAX_TOKENS, CARD_TEMPERATURE, DEFAULT_LANGUAGE};
use crate::config::ProviderKind;
use crate::content::{card_id, ContentCard, ContentCategory, GenerationMetadata};
use crate::errors::{Error, Result};
use crate::providers::{CompletionRequest, TextCompletionClient};

/// Lifecycle of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Idle,
    Extracting,
    Validated,
    Generating,
    Completed,
}

/// One card-generation batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub topics: Vec<String>,
    pub category: ContentCategory,
    /// None means the registry default
    pub provider: Option<ProviderKind>,
    /// Free-form guidance embedded in every card prompt
    pub context: String,
    pub set_id: String,
    pub creator_id: String,
}

impl BatchRequest {
    pub fn new(topics: Vec<String>, category: ContentCategory) -> Self {
        Self {
            topics,
            category,
            provider: None,
            context: String::new(),
            set_id: "draft".to_string(),
            creator_id: String::new(),
        }
    }

    pub fn with_provider(mut self, provider: Option<ProviderKind>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn for_set(mut self, set_id: impl Into<String>, creator_id: impl Into<String>) -> Self {
        self.set_id = set_id.into();
        self.creator_id = creator_id.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TopicStatus {
    Succeeded { card_id: String },
    Failed { reason: String, timed_out: bool },
}

/// Ledger line for one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicOutcome {
    /// 1-based position in the batch
    pub index: usize,
    pub topic: String,
    #[serde(flatten)]
    pub status: TopicStatus,
}

impl TopicOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, TopicStatus::Succeeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub cards: Vec<ContentCard>,
    pub ledger: Vec<TopicOutcome>,
    pub provider_used: ProviderKind,
    pub phases: Vec<BatchPhase>,
    /// Content set the cards were stored under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_set_id: Option<String>,
    /// Set when the cards were generated but could not be stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_error: Option<String>,
}

impl BatchResult {
    pub fn requested(&self) -> usize {
        self.ledger.len()
    }

    pub fn succeeded(&self) -> usize {
        self.ledger.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.requested() - self.succeeded()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn is_total_failure(&self) -> bool {
        self.requested() > 0 && self.succeeded() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TopicOutcome> {
        self.ledger.iter().filter(|o| !o.succeeded())
    }

    pub fn total_cost(&self) -> f64 {
        self.cards.iter().map(|c| c.generation.cost_estimate).sum()
    }

    pub fn is_stored(&self) -> bool {
        self.stored_set_id.is_some()
    }
}

pub struct GenerationOrchestrator {
    client: Arc<TextCompletionClient>,
    parser: Box<dyn CardParser>,
    language: String,
}

impl GenerationOrchestrator {
    pub fn new(client: Arc<TextCompletionClient>) -> Self {
        Self {
            client,
            parser: Box::new(LabeledCardParser::new()),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Swap the card parser (e.g. for a schema-constrained one).
    pub fn with_parser(mut self, parser: Box<dyn CardParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Generate one card per topic, in order.
    ///
    /// Fails only when no provider is live or the topic batch is invalid;
    /// both are checked before any request is sent.
    pub async fn generate_cards(&self, request: &BatchRequest) -> Result<BatchResult> {
        self.run(request, vec![BatchPhase::Idle]).await
    }

    /// Extract topics from `content`, then generate cards for them.
    ///
    /// `template` supplies category, provider, context and ownership; its
    /// topic list is replaced by the extracted one.
    pub async fn extract_and_generate(
        &self,
        content: &str,
        creator_label: &str,
        template: &BatchRequest,
    ) -> Result<BatchResult> {
        let extractor = TopicExtractor::new(self.client.clone()).with_language(self.language.clone());
        let topics = extractor
            .extract(content, &template.context, creator_label, template.provider)
            .await?;

        let request = BatchRequest {
            topics,
            ..template.clone()
        };
        self.run(&request, vec![BatchPhase::Idle, BatchPhase::Extracting])
            .await
    }

    async fn run(&self, request: &BatchRequest, mut phases: Vec<BatchPhase>) -> Result<BatchResult> {
        let provider = self.client.resolve_provider(request.provider)?;
        validate_topic_batch(&request.topics)?;
        phases.push(BatchPhase::Validated);

        let total = request.topics.len();
        tracing::info!(
            "Generating {} cards ({}) via {}",
            total,
            request.category,
            provider
        );
        phases.push(BatchPhase::Generating);

        let mut cards = Vec::with_capacity(total);
        let mut ledger = Vec::with_capacity(total);

        for (i, topic) in request.topics.iter().enumerate() {
            let index = i + 1;
            let topic = topic.trim().to_string();
            let generation = GenerationRequest {
                topic: topic.clone(),
                category: request.category,
                position: index,
                card_count: total,
                provider: Some(provider),
                context: request.context.clone(),
                language: self.language.clone(),
            };

            let status = match self.generate_card(&generation, request).await {
                Ok(card) => {
                    let status = TopicStatus::Succeeded {
                        card_id: card.card_id.clone(),
                    };
                    cards.push(card);
                    status
                }
                Err(e) => {
                    tracing::warn!("Card {}/{} ('{}') failed: {}", index, total, topic, e);
                    TopicStatus::Failed {
                        reason: e.to_string(),
                        timed_out: e.is_timeout(),
                    }
                }
            };
            ledger.push(TopicOutcome {
                index,
                topic,
                status,
            });
        }

        phases.push(BatchPhase::Completed);
        tracing::info!("Batch complete: {}/{} cards generated", cards.len(), total);

        Ok(BatchResult {
            cards,
            ledger,
            provider_used: provider,
            phases,
            stored_set_id: None,
            storage_error: None,
        })
    }

    async fn generate_card(
        &self,
        generation: &GenerationRequest,
        batch: &BatchRequest,
    ) -> Result<ContentCard, Error> {
        let completion_request = CompletionRequest::new(generation.user_prompt())
            .with_system(CARD_SYSTEM_PROMPT)
            .with_max_tokens(CARD_MAX_TOKENS)
            .with_temperature(CARD_TEMPERATURE)
            .with_purpose("card");

        let completion = self
            .client
            .complete_raw(&completion_request, generation.provider)
            .await?;

        let parsed = self.parser.parse(&completion.text);

        let mut domain_data = BTreeMap::new();
        if let Some(tag) = generation.category.domain_tag() {
            domain_data.insert("content_category".to_string(), serde_json::json!(tag));
        }

        let order_index = generation.position as u32;
        Ok(ContentCard {
            card_id: card_id(&batch.set_id, order_index),
            set_id: batch.set_id.clone(),
            creator_id: batch.creator_id.clone(),
            title: parsed.title,
            summary: parsed.summary,
            detailed_content: parsed.detailed_content,
            keywords: parsed.keywords,
            difficulty: parsed.difficulty,
            order_index,
            domain_data,
            generation: GenerationMetadata {
                provider: completion.provider,
                model: completion.model,
                topic: generation.topic.clone(),
                category: generation.category,
                input_tokens: completion.usage.input_tokens,
                output_tokens: completion.usage.output_tokens,
                cost_estimate: completion.cost,
                missing_fields: parsed
                    .missing
                    .iter()
                    .map(|f| f.label().to_string())
                    .collect(),
                generated_at: Utc::now(),
            },
            created_at: Utc::now(),
        })
    }
}
