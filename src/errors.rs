// Error taxonomy
//
// Configuration and validation failures are raised before any network call.
// Generation and timeout failures carry the provider that was asked.
// Card parsing never fails: missing fields become placeholders (see generation::parser).

use thiserror::Error;

use crate::config::ProviderKind;
use crate::providers::ProviderError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// No live provider (or no adapter for one). Fatal for every generation call.
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A single completion call failed at the vendor or transport level.
    #[error("{provider} generation failed: {source}")]
    Generation {
        provider: ProviderKind,
        #[source]
        source: ProviderError,
    },

    #[error("{provider} request timed out after {seconds}s")]
    Timeout { provider: ProviderKind, seconds: u64 },

    /// The storage collaborator rejected or failed an operation.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn no_providers() -> Self {
        Self::Configuration(
            "No LLM providers configured. Set GOOGLE_API_KEY (or GEMINI_API_KEY), \
             ANTHROPIC_API_KEY or OPENAI_API_KEY with a real key."
                .to_string(),
        )
    }

    /// Wrap an anyhow chain from the storage layer, keeping its context.
    pub fn storage(err: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", err))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Input-shape violations. Always recoverable by correcting the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Content is too short for topic extraction ({chars} characters, need at least {min})")]
    ContentTooShort { chars: usize, min: usize },

    #[error("Too few topics: {count} selected, at least {min} required")]
    TooFewTopics { count: usize, min: usize },

    #[error("Too many topics: {count} selected, at most {max} allowed")]
    TooManyTopics { count: usize, max: usize },

    #[error("Topic '{topic}' has {chars} characters; topics must be {min}-{max} characters")]
    TopicLength {
        topic: String,
        chars: usize,
        min: usize,
        max: usize,
    },

    #[error("Duplicate topic: '{topic}'")]
    DuplicateTopic { topic: String },

    #[error("Unknown content category '{0}'")]
    UnknownCategory(String),

    #[error("Temperature {0} is outside the accepted range 0.0-2.0")]
    TemperatureOutOfRange(f32),

    #[error("max_tokens must be greater than zero")]
    ZeroMaxTokens,

    #[error("Creator not found: '{0}'")]
    UnknownCreator(String),

    #[error("Invalid creator: {0}")]
    InvalidCreator(String),
}
