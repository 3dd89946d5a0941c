// Storage collaborator
//
// The generation core only needs a handful of keyed-list operations; the
// flat-file JSON store is the shipped implementation.

use anyhow::Result;

use crate::content::{ContentCard, ContentSet, Creator};

pub mod json_store;

pub use json_store::JsonStore;

/// Keyed-list persistence for creators, content sets and cards.
///
/// `add_*` return `Ok(false)` when the id already exists. No durability or
/// concurrency guarantees beyond what an implementation documents.
pub trait ContentStore: Send + Sync {
    fn add_creator(&self, creator: &Creator) -> Result<bool>;
    fn get_creator(&self, creator_id: &str) -> Result<Option<Creator>>;
    fn list_creators(&self) -> Result<Vec<Creator>>;
    fn delete_creator(&self, creator_id: &str) -> Result<bool>;

    fn add_content_set(&self, set: &ContentSet) -> Result<bool>;
    fn get_content_set(&self, set_id: &str) -> Result<Option<ContentSet>>;
    /// Replace an existing set; `Ok(false)` when it does not exist.
    fn update_content_set(&self, set: &ContentSet) -> Result<bool>;
    fn list_content_sets(&self, creator_id: &str) -> Result<Vec<ContentSet>>;

    fn add_card(&self, card: &ContentCard) -> Result<bool>;
    fn get_cards_by_set(&self, set_id: &str) -> Result<Vec<ContentCard>>;

    /// Look a creator up by id, then by display name (case-insensitive).
    fn find_creator(&self, label: &str) -> Result<Option<Creator>> {
        if let Some(creator) = self.get_creator(label.trim())? {
            return Ok(Some(creator));
        }
        Ok(self
            .list_creators()?
            .into_iter()
            .find(|c| c.matches_label(label)))
    }

    /// Add cards one by one; returns how many were new.
    fn add_cards(&self, cards: &[ContentCard]) -> Result<usize> {
        let mut added = 0;
        for card in cards {
            if self.add_card(card)? {
                added += 1;
            }
        }
        Ok(added)
    }
}
