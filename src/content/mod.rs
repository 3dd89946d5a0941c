// Content data model
//
// Creators own content sets; content sets own cards. Cards are produced by
// the generation pipeline and persisted through the storage collaborator.

mod card;
mod category;
mod creator;

pub use card::{card_id, ContentCard, Difficulty, GenerationMetadata};
pub use category::ContentCategory;
pub use creator::{ContentSet, Creator};
