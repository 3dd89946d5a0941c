// Card generation pipeline
//
// topics (typed or extracted) -> validation -> one completion per topic ->
// structured parse -> ContentCard

pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod topics;
pub mod validation;

pub use orchestrator::{
    BatchPhase, BatchRequest, BatchResult, GenerationOrchestrator, TopicOutcome, TopicStatus,
};
pub use parser::{truncate_chars, CardField, CardParser, LabeledCardParser, ParsedCard, PARSE_FAILED_MARKER};
pub use prompts::{category_guidance, GenerationRequest};
pub use topics::{parse_topic_lines, sanitize_content, TopicExtractor};
pub use validation::{validate_topic, validate_topic_batch};
