use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::keywords::{contains_any, has_positive_mitigation};
use super::oracle::EmotionCapability;
use crate::utils::log_oracle_fallback;

pub const OVERLOAD_TRIGGERS: &[&str] = &[
    "overwhelmed",
    "amount of work",
    "too much",
    "drained",
    "never catch up",
];

pub const NERVOUS_TRIGGERS: &[&str] = &["nervous", "anxious"];

/// The closed set of coarse emotions, in tie-breaking order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Sadness,
    Anger,
    Fear,
    Joy,
    Disgust,
    Surprise,
    Neutral,
}

impl Emotion {
    pub const COUNT: usize = 7;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn all_labels() -> Vec<&'static str> {
        Self::iter().map(|e| e.into()).collect()
    }
}

/// Score per emotion, nominally 0-100. Scores need not sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmotionDistribution {
    scores: [f64; Emotion::COUNT],
}

impl EmotionDistribution {
    pub fn from_pairs(pairs: &[(Emotion, f64)]) -> Self {
        let mut distribution = Self::default();
        for (emotion, score) in pairs {
            distribution.set(*emotion, *score);
        }
        distribution
    }

    pub fn neutral() -> Self {
        Self::from_pairs(&[(Emotion::Neutral, 100.0)])
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        self.scores[emotion.index()]
    }

    pub fn set(&mut self, emotion: Emotion, score: f64) {
        self.scores[emotion.index()] = if score.is_finite() {
            score.max(0.0)
        } else {
            0.0
        };
    }

    /// Highest-scoring emotion; ties go to the earliest in enumeration order.
    pub fn dominant(&self) -> Emotion {
        let mut best = Emotion::Sadness;
        for emotion in Emotion::iter() {
            if self.get(emotion) > self.get(best) {
                best = emotion;
            }
        }
        best
    }

    /// Rounds every score to one decimal place.
    pub fn rounded(&self) -> Self {
        let mut scores = self.scores;
        for score in scores.iter_mut() {
            *score = (*score * 10.0).round() / 10.0;
        }
        Self { scores }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::iter().map(move |e| (e, self.get(e)))
    }
}

impl Serialize for EmotionDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Emotion::COUNT))?;
        for (emotion, score) in self.iter() {
            map.serialize_entry(&emotion, &score)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OverrideKind {
    #[strum(serialize = "overload")]
    Overload,
    #[strum(serialize = "mitigated-nervousness")]
    MitigatedNervousness,
}

/// Where the distribution used downstream came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionSource {
    Override(OverrideKind),
    Oracle,
    Unavailable,
    Fallback,
}

impl fmt::Display for EmotionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override(kind) => write!(f, "override ({kind})"),
            Self::Oracle => write!(f, "oracle"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionAnalysis {
    pub distribution: EmotionDistribution,
    pub dominant: Emotion,
    pub source: EmotionSource,
}

impl EmotionAnalysis {
    fn neutral(source: EmotionSource) -> Self {
        Self {
            distribution: EmotionDistribution::neutral(),
            dominant: Emotion::Neutral,
            source,
        }
    }
}

pub struct OverrideRule {
    pub kind: OverrideKind,
    applies: fn(&str) -> bool,
    produce: fn(&str) -> (EmotionDistribution, Emotion),
}

impl OverrideRule {
    pub fn applies(&self, text_lower: &str) -> bool {
        (self.applies)(text_lower)
    }

    pub fn produce(&self, text_lower: &str) -> EmotionAnalysis {
        let (distribution, dominant) = (self.produce)(text_lower);
        EmotionAnalysis {
            distribution,
            dominant,
            source: EmotionSource::Override(self.kind),
        }
    }
}

/// Evaluated in order; the first rule that applies replaces the oracle entirely.
pub const OVERRIDE_RULES: &[OverrideRule] = &[
    OverrideRule {
        kind: OverrideKind::Overload,
        applies: is_overloaded,
        produce: overload_distribution,
    },
    OverrideRule {
        kind: OverrideKind::MitigatedNervousness,
        applies: is_mitigated_nervousness,
        produce: mitigated_nervousness_distribution,
    },
];

fn is_overloaded(text_lower: &str) -> bool {
    contains_any(text_lower, OVERLOAD_TRIGGERS)
}

fn overload_distribution(text_lower: &str) -> (EmotionDistribution, Emotion) {
    let distribution = EmotionDistribution::from_pairs(&[
        (Emotion::Fear, 50.0),
        (Emotion::Sadness, 40.0),
        (Emotion::Anger, 5.0),
        (Emotion::Neutral, 2.0),
        (Emotion::Surprise, 1.0),
        (Emotion::Joy, 1.0),
        (Emotion::Disgust, 1.0),
    ]);
    let dominant = if text_lower.contains("overwhelmed") {
        Emotion::Fear
    } else {
        Emotion::Sadness
    };
    (distribution, dominant)
}

fn is_mitigated_nervousness(text_lower: &str) -> bool {
    contains_any(text_lower, NERVOUS_TRIGGERS) && has_positive_mitigation(text_lower)
}

fn mitigated_nervousness_distribution(_: &str) -> (EmotionDistribution, Emotion) {
    let distribution = EmotionDistribution::from_pairs(&[
        (Emotion::Neutral, 60.0),
        (Emotion::Joy, 20.0),
        (Emotion::Fear, 15.0),
        (Emotion::Sadness, 0.0),
        (Emotion::Anger, 0.0),
        (Emotion::Disgust, 0.0),
        (Emotion::Surprise, 5.0),
    ]);
    (distribution, Emotion::Neutral)
}

pub fn match_override(text_lower: &str) -> Option<EmotionAnalysis> {
    OVERRIDE_RULES
        .iter()
        .find(|rule| rule.applies(text_lower))
        .map(|rule| rule.produce(text_lower))
}

/// Resolves the emotion distribution for `text`: override rules first, then the
/// oracle on the first `char_limit` characters, then the neutral fallback.
pub fn resolve_emotions(
    text: &str,
    capability: &EmotionCapability,
    char_limit: usize,
) -> EmotionAnalysis {
    let text_lower = text.to_lowercase();
    if let Some(analysis) = match_override(&text_lower) {
        return analysis;
    }

    let oracle = match capability {
        EmotionCapability::Available(oracle) => oracle,
        EmotionCapability::Unavailable => {
            return EmotionAnalysis::neutral(EmotionSource::Unavailable)
        }
    };

    let truncated: String = text.chars().take(char_limit).collect();
    match oracle.classify(&truncated) {
        Ok(raw) => {
            let distribution = raw.rounded();
            EmotionAnalysis {
                dominant: distribution.dominant(),
                distribution,
                source: EmotionSource::Oracle,
            }
        }
        Err(e) => {
            log_oracle_fallback("emotion", &e);
            EmotionAnalysis::neutral(EmotionSource::Fallback)
        }
    }
}
