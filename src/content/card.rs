// Content cards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::category::ContentCategory;
use crate::config::ProviderKind;

/// Card difficulty. Unrecognised model output is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Other(String),
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Other(value) => value,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "beginner" => Self::Beginner,
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            _ => Self::Other(value),
        }
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a card came from, kept for traceability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub provider: ProviderKind,
    pub model: String,
    pub topic: String,
    pub category: ContentCategory,
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
    #[serde(default)]
    pub cost_estimate: f64,
    /// Labels that fell back to placeholders while parsing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentCard {
    pub card_id: String,
    pub set_id: String,
    pub creator_id: String,

    pub title: String,
    pub summary: String,
    pub detailed_content: String,
    pub keywords: Vec<String>,
    pub difficulty: Difficulty,

    /// 1-based position in the batch that produced this card
    pub order_index: u32,

    #[serde(default)]
    pub domain_data: BTreeMap<String, serde_json::Value>,

    pub generation: GenerationMetadata,

    pub created_at: DateTime<Utc>,
}

/// `{set_id}_card_{NNN}`
pub fn card_id(set_id: &str, order_index: u32) -> String {
    format!("{}_card_{:03}", set_id, order_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_is_zero_padded() {
        assert_eq!(card_id("ana_abc", 7), "ana_abc_card_007");
        assert_eq!(card_id("ana_abc", 12), "ana_abc_card_012");
    }

    #[test]
    fn test_difficulty_keeps_unknown_values() {
        assert_eq!(Difficulty::from("Advanced".to_string()), Difficulty::Advanced);
        let other = Difficulty::from("expert".to_string());
        assert_eq!(other, Difficulty::Other("expert".to_string()));
        assert!(!other.is_recognized());
    }

    #[test]
    fn test_difficulty_serializes_as_plain_string() {
        let json = serde_json::to_string(&Difficulty::Beginner).unwrap();
        assert_eq!(json, "\"beginner\"");
        let back: Difficulty = serde_json::from_str("\"médio\"").unwrap();
        assert_eq!(back, Difficulty::Other("médio".to_string()));
    }
}
