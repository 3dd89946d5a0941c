// Prompt construction for card generation and topic extraction

use crate::config::constants::{
    EXTRACTION_MAX_TOPICS, TOPIC_MAX_CHARS, TOPIC_MIN_CHARS,
};
use crate::config::ProviderKind;
use crate::content::ContentCategory;

pub const CARD_SYSTEM_PROMPT: &str = "You are an expert educational content creator. \
Generate structured content exactly as requested in the user prompt, following the specified format strictly.";

pub const TOPIC_SYSTEM_PROMPT: &str = "You are an editor who identifies the distinct, \
teachable topics in a text. Answer only with the list of topics.";

const FALLBACK_GUIDANCE: &str = "Provide accurate, engaging educational content. \
Ensure all requested fields are present in the output.";

/// Tone and focus hints per category; unmapped categories get a generic hint.
pub fn category_guidance(category: ContentCategory) -> &'static str {
    match category {
        ContentCategory::SpaceExploration => {
            "Focus on historical facts, scientific accuracy, and inspiring human achievement stories."
        }
        ContentCategory::Wellness => {
            "Emphasize practical advice, scientific backing, and holistic health approaches."
        }
        ContentCategory::Nutrition => {
            "Provide evidence-based information, practical tips, and myth-busting facts."
        }
        ContentCategory::EarthMysteries => {
            "Balance scientific explanation with fascinating unknowns and ongoing research."
        }
        ContentCategory::General => "Provide accurate, engaging educational content.",
        _ => FALLBACK_GUIDANCE,
    }
}

/// Human-readable name for a language tag used inside prompts.
pub fn language_name(tag: &str) -> String {
    match tag.to_lowercase().as_str() {
        "pt-br" | "pt_br" => "Portuguese (Brazil)".to_string(),
        "pt" | "pt-pt" => "Portuguese".to_string(),
        "en" | "en-us" | "en-gb" => "English".to_string(),
        "es" | "es-es" | "es-mx" => "Spanish".to_string(),
        _ => tag.to_string(),
    }
}

/// Everything needed to prompt for one card. Transient: one per topic per batch.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub topic: String,
    pub category: ContentCategory,
    /// 1-based position of this card in the batch
    pub position: usize,
    /// Total cards requested in the batch
    pub card_count: usize,
    /// None means the registry default
    pub provider: Option<ProviderKind>,
    /// Free-form guidance from the caller (creator focus, audience, ...)
    pub context: String,
    pub language: String,
}

impl GenerationRequest {
    pub fn user_prompt(&self) -> String {
        let mut context = format!("Card {} of {}.", self.position, self.card_count);
        if !self.context.trim().is_empty() {
            context.push(' ');
            context.push_str(self.context.trim());
        }

        format!(
            "Context for this card: {context}\n\
             Topic to address: {topic}\n\
             Content Type: {category}\n\
             Specific Guidelines for this content: {guidance}\n\
             \n\
             Please generate content in {language}.\n\
             \n\
             Your response MUST strictly follow this format, with each field on a new line:\n\
             TITLE: [An engaging title, often in a question format, related to the topic. Max 200 characters.]\n\
             SUMMARY: [A brief answer or overview of the topic. 2-3 sentences, max 300 characters.]\n\
             DETAILED: [A more comprehensive explanation. 3-4 paragraphs, max 1500 characters. Include interesting facts and use accessible language.]\n\
             KEYWORDS: [Provide 5 to 7 relevant keywords, comma-separated. Example: keyword1, keyword2, keyword3]\n\
             DIFFICULTY: [Choose one: beginner, intermediate, or advanced. Example: intermediate]\n\
             \n\
             Ensure every field (TITLE, SUMMARY, DETAILED, KEYWORDS, DIFFICULTY) is present. \
             Do not add any extra text, greetings, or explanations outside this structure.",
            context = context,
            topic = self.topic,
            category = self.category,
            guidance = category_guidance(self.category),
            language = language_name(&self.language),
        )
    }
}

/// User prompt asking for one topic per line.
pub fn topic_extraction_prompt(
    content: &str,
    guidance: &str,
    creator_label: &str,
    language: &str,
) -> String {
    let mut prompt = String::new();
    if !creator_label.trim().is_empty() {
        prompt.push_str(&format!("Creator: {}\n", creator_label.trim()));
    }
    if !guidance.trim().is_empty() {
        prompt.push_str(&format!("Focus: {}\n", guidance.trim()));
    }
    prompt.push_str(&format!(
        "\nRead the text below and list between 5 and 10 distinct topics it covers that \
         would each make a good educational card.\n\
         Rules:\n\
         - One topic per line\n\
         - Each topic between {min} and {max} characters\n\
         - No numbering, bullets, quotes or extra commentary\n\
         - At most {cap} topics\n\
         - Write the topics in {language}\n\
         \n\
         TEXT:\n{content}",
        min = TOPIC_MIN_CHARS,
        max = TOPIC_MAX_CHARS,
        cap = EXTRACTION_MAX_TOPICS,
        language = language_name(language),
        content = content,
    ));
    prompt
}
