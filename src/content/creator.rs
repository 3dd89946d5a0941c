// Creators and content sets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::ContentCategory;
use crate::config::constants::MINUTES_PER_CARD;
use crate::errors::ValidationError;

const HANDLE_MAX_CHARS: usize = 15;

fn short_uuid() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Lowercase alphanumerics only, capped at 15 chars.
fn handle_from(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .take(HANDLE_MAX_CHARS)
        .collect()
}

/// Lowercase, keep alphanumerics, spaces and dashes, spaces become underscores.
fn slug_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .collect::<String>()
        .replace(' ', "_")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub creator_id: String,
    pub display_name: String,
    /// youtube, instagram, tiktok, website, ...
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub platform_handle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<ContentCategory>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Creator {
    /// New creator with a generated id (`{handle}_{8 hex}`).
    pub fn new(
        display_name: &str,
        description: &str,
        categories: Vec<ContentCategory>,
    ) -> Result<Self, ValidationError> {
        let display_name = display_name.trim();
        let handle = handle_from(display_name);
        if handle.is_empty() {
            return Err(ValidationError::InvalidCreator(
                "display name must contain at least one letter or digit".to_string(),
            ));
        }

        Ok(Self {
            creator_id: format!("{}_{}", handle, short_uuid()),
            display_name: display_name.to_string(),
            platform: String::new(),
            platform_handle: String::new(),
            description: description.trim().to_string(),
            categories,
            social_links: BTreeMap::new(),
            created_at: Utc::now(),
        })
    }

    /// Set the platform and derive the id from the handle instead of the display name.
    pub fn with_platform(mut self, platform: &str, handle: &str) -> Self {
        let clean = handle.trim().trim_start_matches('@').to_lowercase();
        if !clean.is_empty() {
            self.creator_id = format!("{}_{}", clean, short_uuid());
        }
        self.platform = platform.trim().to_lowercase();
        self.platform_handle = handle.trim().to_string();
        self
    }

    pub fn with_social_link(mut self, network: &str, url: &str) -> Self {
        self.social_links
            .insert(network.trim().to_lowercase(), url.trim().to_string());
        self
    }

    /// First declared category, or General.
    pub fn primary_category(&self) -> ContentCategory {
        self.categories.first().copied().unwrap_or_default()
    }

    /// Case-insensitive match against id or display name.
    pub fn matches_label(&self, label: &str) -> bool {
        let label = label.trim();
        self.creator_id == label || self.display_name.to_lowercase() == label.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSet {
    pub set_id: String,
    pub creator_id: String,
    pub title: String,
    pub description: String,
    pub category: ContentCategory,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub card_count: u32,
    #[serde(default)]
    pub estimated_time_minutes: u32,
    #[serde(default = "default_language")]
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_language() -> String {
    crate::config::constants::DEFAULT_LANGUAGE.to_string()
}

impl ContentSet {
    /// New empty set with id `{creator_id}_{slug}_{8 hex}`.
    pub fn new(creator_id: &str, title: &str, description: &str, category: ContentCategory) -> Self {
        let now = Utc::now();
        Self {
            set_id: format!("{}_{}_{}", creator_id, slug_title(title), short_uuid()),
            creator_id: creator_id.to_string(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            category,
            topics: Vec::new(),
            card_count: 0,
            estimated_time_minutes: 0,
            language: default_language(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Record how many cards the set ended up with.
    pub fn set_card_count(&mut self, card_count: u32) {
        self.card_count = card_count;
        self.estimated_time_minutes = card_count * MINUTES_PER_CARD;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_id_from_display_name() {
        let creator = Creator::new("Dra. Ana Souza!", "Bem-estar", vec![]).unwrap();
        let (handle, suffix) = creator.creator_id.rsplit_once('_').unwrap();
        assert_eq!(handle, "draanasouza");
        assert_eq!(suffix.len(), 8);
        assert_eq!(creator.primary_category(), ContentCategory::General);
    }

    #[test]
    fn test_creator_id_from_handle() {
        let creator = Creator::new("Ana", "", vec![ContentCategory::Wellness])
            .unwrap()
            .with_platform("Instagram", "@AnaWell");
        assert!(creator.creator_id.starts_with("anawell_"));
        assert_eq!(creator.platform, "instagram");
        assert_eq!(creator.primary_category(), ContentCategory::Wellness);
    }

    #[test]
    fn test_social_links_keyed_by_lowercase_network() {
        let creator = Creator::new("Ana", "", vec![])
            .unwrap()
            .with_social_link(" YouTube ", " https://youtube.com/@ana ")
            .with_social_link("youtube", "https://youtube.com/@ana2");
        assert_eq!(creator.social_links.len(), 1);
        assert_eq!(creator.social_links["youtube"], "https://youtube.com/@ana2");
    }

    #[test]
    fn test_creator_requires_name() {
        assert!(Creator::new("  !!  ", "", vec![]).is_err());
    }

    #[test]
    fn test_matches_label_case_insensitive() {
        let creator = Creator::new("Ana Souza", "", vec![]).unwrap();
        assert!(creator.matches_label("ana souza"));
        assert!(creator.matches_label(&creator.creator_id.clone()));
        assert!(!creator.matches_label("ana"));
    }

    #[test]
    fn test_set_id_and_time_estimate() {
        let mut set = ContentSet::new("ana_12345678", "Meditação Diária", "", ContentCategory::Wellness);
        assert!(set.set_id.starts_with("ana_12345678_meditação_diária_"));
        set.set_card_count(4);
        assert_eq!(set.card_count, 4);
        assert_eq!(set.estimated_time_minutes, 12);
    }
}
