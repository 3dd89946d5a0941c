// Structured card parser
//
// The card prompt asks for five labelled segments (TITLE, SUMMARY, DETAILED,
// KEYWORDS, DIFFICULTY). Models drift from that layout, so each label is
// located independently and every field comes back populated: real value,
// truncated value, or a marked placeholder.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::constants::{DETAIL_MAX_CHARS, SUMMARY_MAX_CHARS, TITLE_MAX_CHARS};
use crate::content::Difficulty;

/// Prefix of every placeholder the parser substitutes for a missing field.
pub const PARSE_FAILED_MARKER: &str = "[parse failed]";

const ELLIPSIS: &str = "...";

/// The five logical fields of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Title,
    Summary,
    Detailed,
    Keywords,
    Difficulty,
}

impl CardField {
    pub const ALL: [CardField; 5] = [
        Self::Title,
        Self::Summary,
        Self::Detailed,
        Self::Keywords,
        Self::Difficulty,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "TITLE",
            Self::Summary => "SUMMARY",
            Self::Detailed => "DETAILED",
            Self::Keywords => "KEYWORDS",
            Self::Difficulty => "DIFFICULTY",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        let label = label.to_uppercase();
        Self::ALL.into_iter().find(|f| f.label() == label)
    }

    fn placeholder(&self) -> String {
        format!("{} {} not found in model output", PARSE_FAILED_MARKER, self.label())
    }
}

/// Parser output: always all five fields, plus which ones were substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCard {
    pub title: String,
    pub summary: String,
    pub detailed_content: String,
    pub keywords: Vec<String>,
    pub difficulty: Difficulty,
    /// Fields that fell back to placeholders
    pub missing: Vec<CardField>,
}

impl ParsedCard {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Turns raw completion text into card fields. Never fails.
pub trait CardParser: Send + Sync {
    fn parse(&self, raw: &str) -> ParsedCard;
}

/// Label-anchored parser for the five-label text convention.
#[derive(Debug, Clone)]
pub struct LabeledCardParser {
    title_max: usize,
    summary_max: usize,
    detail_max: usize,
}

impl Default for LabeledCardParser {
    fn default() -> Self {
        Self {
            title_max: TITLE_MAX_CHARS,
            summary_max: SUMMARY_MAX_CHARS,
            detail_max: DETAIL_MAX_CHARS,
        }
    }
}

// A label at the start of a line (any case, optional markdown decoration such
// as "**Title:**" or "## SUMMARY:"), or an upper-case label anywhere.
static LINE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t>#*_-]*(title|summary|detailed|keywords|difficulty)[ \t]*[*_]*[ \t]*:[*_]*",
    )
    .expect("Should compile: LINE_LABEL")
});

static INLINE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(TITLE|SUMMARY|DETAILED|KEYWORDS|DIFFICULTY):")
        .expect("Should compile: INLINE_LABEL")
});

static DIFFICULTY_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(beginner|intermediate|advanced)\b")
        .expect("Should compile: DIFFICULTY_WORD")
});

struct LabelHit {
    field: CardField,
    start: usize,
    end: usize,
}

impl LabeledCardParser {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_labels(raw: &str) -> Vec<LabelHit> {
        let mut hits: Vec<LabelHit> = Vec::new();
        for re in [&*LINE_LABEL, &*INLINE_LABEL] {
            for caps in re.captures_iter(raw) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let Some(field) = CardField::from_label(name.as_str()) else {
                    continue;
                };
                // Both patterns can hit the same label; keep the first by position
                if hits.iter().any(|h| h.start <= name.start() && name.start() < h.end) {
                    continue;
                }
                hits.push(LabelHit {
                    field,
                    start: whole.start(),
                    end: whole.end(),
                });
            }
        }
        hits.sort_by_key(|h| h.start);
        hits
    }

    /// Value of the first occurrence of each label, running to the next label.
    fn segments(raw: &str) -> Vec<(CardField, String)> {
        let hits = Self::find_labels(raw);
        let mut segments: Vec<(CardField, String)> = Vec::new();
        for (i, hit) in hits.iter().enumerate() {
            if segments.iter().any(|(f, _)| *f == hit.field) {
                continue;
            }
            let end = hits.get(i + 1).map(|next| next.start).unwrap_or(raw.len());
            segments.push((hit.field, raw[hit.end..end].to_string()));
        }
        segments
    }

    fn field_text(segments: &[(CardField, String)], field: CardField) -> Option<&str> {
        segments
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value.as_str())
    }
}

/// Strip markdown emphasis and surrounding whitespace.
fn clean(value: &str) -> String {
    value
        .trim()
        .trim_matches(['*', '_'])
        .trim()
        .to_string()
}

fn first_line(value: &str) -> Option<String> {
    value
        .lines()
        .map(clean)
        .find(|line| !line.is_empty())
}

fn block(value: &str) -> Option<String> {
    let text = value
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let text = clean(&text);
    (!text.is_empty()).then_some(text)
}

fn keywords(value: &str) -> Vec<String> {
    value
        .split([',', '\n'])
        .map(|k| clean(k.trim().trim_start_matches(['-', '•'])))
        .map(|k| k.trim_matches(['[', ']', '.']).trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

fn difficulty(value: &str) -> Option<Difficulty> {
    if let Some(m) = DIFFICULTY_WORD.find(value) {
        return Some(Difficulty::from(m.as_str().to_lowercase()));
    }
    first_line(value).map(|line| Difficulty::Other(line.to_lowercase()))
}

/// Cut to `max` characters, ending in "..." when anything was removed.
///
/// Text already at or under the limit is returned unchanged, so truncating a
/// truncated value is a no-op.
pub fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = value.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

impl CardParser for LabeledCardParser {
    fn parse(&self, raw: &str) -> ParsedCard {
        let segments = Self::segments(raw);
        let mut missing = Vec::new();

        let mut text_field = |field: CardField, max: usize, multiline: bool| -> String {
            let value = Self::field_text(&segments, field).and_then(|v| {
                if multiline {
                    block(v)
                } else {
                    first_line(v)
                }
            });
            match value {
                Some(v) => truncate_chars(&v, max),
                None => {
                    missing.push(field);
                    field.placeholder()
                }
            }
        };

        let title = text_field(CardField::Title, self.title_max, false);
        let summary = text_field(CardField::Summary, self.summary_max, true);
        let detailed_content = text_field(CardField::Detailed, self.detail_max, true);

        let keywords = match Self::field_text(&segments, CardField::Keywords).map(keywords) {
            Some(list) if !list.is_empty() => list,
            _ => {
                missing.push(CardField::Keywords);
                vec![PARSE_FAILED_MARKER.to_string()]
            }
        };

        let difficulty = match Self::field_text(&segments, CardField::Difficulty).and_then(difficulty) {
            Some(d) => d,
            None => {
                missing.push(CardField::Difficulty);
                Difficulty::Other(CardField::Difficulty.placeholder())
            }
        };

        if !missing.is_empty() {
            tracing::debug!(
                "Card parse fell back to placeholders for: {}",
                missing.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
            );
        }

        ParsedCard {
            title,
            summary,
            detailed_content,
            keywords,
            difficulty,
            missing,
        }
    }
}
