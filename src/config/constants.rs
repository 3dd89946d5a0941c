// Project-wide constants
//
// Centralised here so limits and prompt budgets have one source of truth.
// Import via `use crate::config::constants::*;`.

/// Default per-call timeout for provider requests.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Upper bound accepted for `request_timeout_secs` in the config file.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Output language requested from the model unless configured otherwise.
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// Directory under $HOME holding config.toml and the default data dir.
pub const CONFIG_DIR_NAME: &str = ".infogen";

// Card field limits (characters)
pub const TITLE_MAX_CHARS: usize = 200;
pub const SUMMARY_MAX_CHARS: usize = 300;
pub const DETAIL_MAX_CHARS: usize = 1500;

// Topic limits
pub const TOPIC_MIN_CHARS: usize = 5;
pub const TOPIC_MAX_CHARS: usize = 60;
pub const BATCH_MIN_TOPICS: usize = 3;
pub const BATCH_MAX_TOPICS: usize = 15;
pub const EXTRACTION_MAX_TOPICS: usize = 15;

/// Minimum normalised length of text handed to topic extraction.
pub const EXTRACTION_MIN_CONTENT_CHARS: usize = 50;

/// Sanitised content is cut to this many characters before prompting.
pub const EXTRACTION_MAX_CONTENT_CHARS: usize = 15_000;

// Sampling budgets
pub const CARD_MAX_TOKENS: u32 = 2000;
pub const CARD_TEMPERATURE: f32 = 0.6;
pub const EXTRACTION_MAX_TOKENS: u32 = 500;
pub const EXTRACTION_TEMPERATURE: f32 = 0.3;

/// Token usage assumed per card when comparing provider costs.
pub const ESTIMATED_INPUT_TOKENS_PER_CARD: u32 = 800;
pub const ESTIMATED_OUTPUT_TOKENS_PER_CARD: u32 = 600;

/// Reading time budget per card when sizing a content set.
pub const MINUTES_PER_CARD: u32 = 3;
