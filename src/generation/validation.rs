// Topic batch validation
//
// The gate in front of card generation. Stricter than the per-line filter
// used during extraction, because topics can also be typed in by hand.

use std::collections::HashSet;

use crate::config::constants::{BATCH_MAX_TOPICS, BATCH_MIN_TOPICS, TOPIC_MAX_CHARS, TOPIC_MIN_CHARS};
use crate::errors::ValidationError;

/// Check one topic's trimmed length.
pub fn validate_topic(topic: &str) -> Result<(), ValidationError> {
    let chars = topic.trim().chars().count();
    if !(TOPIC_MIN_CHARS..=TOPIC_MAX_CHARS).contains(&chars) {
        return Err(ValidationError::TopicLength {
            topic: topic.trim().to_string(),
            chars,
            min: TOPIC_MIN_CHARS,
            max: TOPIC_MAX_CHARS,
        });
    }
    Ok(())
}

/// 3-15 topics, each 5-60 characters, unique ignoring case.
///
/// Returns the first violation found; never panics.
pub fn validate_topic_batch<S: AsRef<str>>(topics: &[S]) -> Result<(), ValidationError> {
    let count = topics.len();
    if count < BATCH_MIN_TOPICS {
        return Err(ValidationError::TooFewTopics {
            count,
            min: BATCH_MIN_TOPICS,
        });
    }
    if count > BATCH_MAX_TOPICS {
        return Err(ValidationError::TooManyTopics {
            count,
            max: BATCH_MAX_TOPICS,
        });
    }

    let mut seen = HashSet::with_capacity(count);
    for topic in topics {
        let topic = topic.as_ref();
        validate_topic(topic)?;
        if !seen.insert(topic.trim().to_lowercase()) {
            return Err(ValidationError::DuplicateTopic {
                topic: topic.trim().to_string(),
            });
        }
    }
    Ok(())
}
