use regex::Regex;
use std::sync::LazyLock;
use strum::Display;

use crate::settings::settings;

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z]{2,}").expect("valid word pattern"));

#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult {
    Pass,
    Reject(Filter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Filter {
    #[strum(serialize = "empty")]
    Empty,
    #[strum(serialize = "min-length")]
    MinLength,
    #[strum(serialize = "unintelligible")]
    Unintelligible,
}

impl Filter {
    pub fn message(&self) -> String {
        match self {
            Filter::Empty => "Please enter some text to analyze".to_string(),
            Filter::MinLength => format!(
                "Please write a bit more (at least {} characters) for better analysis",
                settings().analysis.min_text_length
            ),
            Filter::Unintelligible => {
                "Could not understand the audio. Please try again or type your check-in instead"
                    .to_string()
            }
        }
    }
}

/// Rejects text that is blank or shorter than the configured minimum once trimmed.
pub fn apply_filters(text: &str) -> FilterResult {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return FilterResult::Reject(Filter::Empty);
    }

    if trimmed.chars().count() < settings().analysis.min_text_length {
        return FilterResult::Reject(Filter::MinLength);
    }

    FilterResult::Pass
}

/// A transcript counts as speech when it holds at least one alphabetic word.
pub fn is_intelligible(transcript: &str) -> bool {
    WORD_PATTERN.is_match(transcript)
}
