use serde::{Serialize, Serializer};
use std::fmt::Display;

/// A discrete band of a 0-100 score.
pub trait ScoreLevel: Copy + Display {
    fn from_score(score: u8) -> Self;
    fn explanation(&self) -> &'static str;
    /// Presentation tag used by clients to style the result.
    fn label_class(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KeywordMatches {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub positive: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_phrases: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult<L: ScoreLevel> {
    pub score: u8,
    #[serde(serialize_with = "serialize_level")]
    pub level: L,
    pub explanation: &'static str,
    pub label_class: &'static str,
    pub keyword_matches: KeywordMatches,
}

impl<L: ScoreLevel> ScoreResult<L> {
    /// Clamps `raw` to 0-100 and truncates toward zero.
    pub fn new(raw: f64, keyword_matches: KeywordMatches) -> Self {
        let score = clamp_score(raw);
        let level = L::from_score(score);
        Self {
            score,
            level,
            explanation: level.explanation(),
            label_class: level.label_class(),
            keyword_matches,
        }
    }
}

pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0) as u8
}

fn serialize_level<L: ScoreLevel, S: Serializer>(level: &L, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(level)
}
