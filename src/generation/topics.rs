// Topic extraction
//
// Turns a long passage into a short list of candidate topics with one
// low-temperature completion. Precondition failures surface as errors before
// any network call; every failure after that collapses to an empty list.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::prompts::{topic_extraction_prompt, TOPIC_SYSTEM_PROMPT};
use crate::config::constants::{
    DEFAULT_LANGUAGE, EXTRACTION_MAX_CONTENT_CHARS, EXTRACTION_MAX_TOKENS, EXTRACTION_MAX_TOPICS,
    EXTRACTION_MIN_CONTENT_CHARS, EXTRACTION_TEMPERATURE, TOPIC_MAX_CHARS, TOPIC_MIN_CHARS,
};
use crate::config::ProviderKind;
use crate::errors::{Result, ValidationError};
use crate::providers::{CompletionRequest, TextCompletionClient};

// Word characters (Unicode, so accented Latin letters survive), whitespace
// and basic punctuation are kept; everything else is dropped.
static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^\w\s.,;:!?()'"%-]"#).expect("Should compile: DISALLOWED_CHARS")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Should compile: WHITESPACE_RUN"));

// "1.", "2)", "(3)", "-", "*", "•", "Topic 4:" style prefixes
static LIST_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(?:topic|tópico)\s*\d*\s*[:.)-]\s*|\(?\d+[.):-]\)?\s+|[-*•·+]+\s*)+")
        .expect("Should compile: LIST_PREFIX")
});

/// Collapse whitespace runs and trim.
pub fn normalize_whitespace(content: &str) -> String {
    WHITESPACE_RUN.replace_all(content.trim(), " ").into_owned()
}

/// Drop characters outside the allow-list and cap the length.
pub fn sanitize_content(content: &str) -> String {
    let cleaned = DISALLOWED_CHARS.replace_all(content, "");
    let normalized = normalize_whitespace(&cleaned);
    normalized.chars().take(EXTRACTION_MAX_CONTENT_CHARS).collect()
}

/// Parse a model reply into topics: one per line, list noise stripped,
/// 5-60 characters, exact duplicates removed, at most 15.
pub fn parse_topic_lines(reply: &str) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for line in reply.lines() {
        let stripped = LIST_PREFIX.replace(line, "");
        let topic = stripped
            .trim()
            .trim_matches(['"', '\'', '*', '`', '“', '”'])
            .trim()
            .trim_end_matches(['.', ';', ','])
            .trim()
            .to_string();

        let chars = topic.chars().count();
        if !(TOPIC_MIN_CHARS..=TOPIC_MAX_CHARS).contains(&chars) {
            continue;
        }
        if topics.contains(&topic) {
            continue;
        }
        topics.push(topic);
        if topics.len() == EXTRACTION_MAX_TOPICS {
            break;
        }
    }
    topics
}

pub struct TopicExtractor {
    client: Arc<TextCompletionClient>,
    language: String,
}

impl TopicExtractor {
    pub fn new(client: Arc<TextCompletionClient>) -> Self {
        Self {
            client,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Extract candidate topics from `content`.
    ///
    /// Errors only on preconditions (short content, no live provider), which
    /// are checked before any request is sent. Provider failures, empty
    /// replies and replies with no usable line all return `Ok(vec![])`.
    pub async fn extract(
        &self,
        content: &str,
        guidance: &str,
        creator_label: &str,
        provider: Option<ProviderKind>,
    ) -> Result<Vec<String>> {
        let normalized = normalize_whitespace(content);
        let chars = normalized.chars().count();
        if chars < EXTRACTION_MIN_CONTENT_CHARS {
            return Err(ValidationError::ContentTooShort {
                chars,
                min: EXTRACTION_MIN_CONTENT_CHARS,
            }
            .into());
        }

        let provider = self.client.resolve_provider(provider)?;

        let sanitized = sanitize_content(&normalized);
        let prompt = topic_extraction_prompt(&sanitized, guidance, creator_label, &self.language);
        let request = CompletionRequest::new(prompt)
            .with_system(TOPIC_SYSTEM_PROMPT)
            .with_max_tokens(EXTRACTION_MAX_TOKENS)
            .with_temperature(EXTRACTION_TEMPERATURE)
            .with_purpose("topics");

        let reply = match self.client.complete_raw(&request, Some(provider)).await {
            Ok(completion) => completion.text,
            Err(e) => {
                tracing::warn!("Topic extraction failed: {}", e);
                return Ok(Vec::new());
            }
        };

        let topics = parse_topic_lines(&reply);
        if topics.is_empty() {
            tracing::warn!("Topic extraction produced no usable topics");
        } else {
            tracing::info!("Extracted {} topics via {}", topics.len(), provider);
        }
        Ok(topics)
    }
}
