use strum::Display;

use super::emotion::{Emotion, EmotionDistribution};
use super::keywords::{count_lowered, LexiconCategory};
use super::score::{KeywordMatches, ScoreLevel, ScoreResult};

pub const WEIGHT_HIGH: f64 = 60.0;
pub const WEIGHT_MEDIUM: f64 = 35.0;
pub const WEIGHT_LOW: f64 = 15.0;

pub const WEIGHT_FEAR: f64 = 0.9;
pub const WEIGHT_ANGER: f64 = 0.5;
pub const WEIGHT_SURPRISE: f64 = 0.3;
pub const WEIGHT_SADNESS: f64 = 0.6;
pub const WEIGHT_SENTIMENT: f64 = 15.0;

pub const WEIGHT_POSITIVE: f64 = 50.0;

pub const STRESS_DIVISOR: f64 = 1.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StressLevel {
    #[strum(serialize = "HIGH STRESS")]
    High,
    #[strum(serialize = "MODERATE STRESS")]
    Moderate,
    #[strum(serialize = "LOW STRESS")]
    Low,
}

impl StressLevel {
    pub const HIGH_THRESHOLD: u8 = 70;
    pub const MODERATE_THRESHOLD: u8 = 40;
}

impl ScoreLevel for StressLevel {
    fn from_score(score: u8) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            StressLevel::High
        } else if score >= Self::MODERATE_THRESHOLD {
            StressLevel::Moderate
        } else {
            StressLevel::Low
        }
    }

    fn explanation(&self) -> &'static str {
        match self {
            StressLevel::High => {
                "🔴 High stress detected. Your body and mind are under significant pressure."
            }
            StressLevel::Moderate => {
                "🟡 Moderate stress levels. Good time to practice stress management."
            }
            StressLevel::Low => "🟢 Low stress levels. You're handling things well.",
        }
    }

    fn label_class(&self) -> &'static str {
        match self {
            StressLevel::High => "dangerous",
            StressLevel::Moderate => "moderate-risk",
            StressLevel::Low => "safe",
        }
    }
}

pub type StressScore = ScoreResult<StressLevel>;

/// Rates stress 0-100 (higher is more stressed).
pub fn score_stress(text: &str, emotions: &EmotionDistribution, polarity: f64) -> StressScore {
    let text_lower = text.to_lowercase();

    let high = count_lowered(&text_lower, LexiconCategory::StressHigh);
    let medium = count_lowered(&text_lower, LexiconCategory::StressMedium);
    let low = count_lowered(&text_lower, LexiconCategory::StressLow);
    let positive = count_lowered(&text_lower, LexiconCategory::Positive);

    let keyword_score =
        high as f64 * WEIGHT_HIGH + medium as f64 * WEIGHT_MEDIUM + low as f64 * WEIGHT_LOW;

    let mut raw_stress = keyword_score
        + WEIGHT_FEAR * emotions.get(Emotion::Fear)
        + WEIGHT_ANGER * emotions.get(Emotion::Anger)
        + WEIGHT_SURPRISE * emotions.get(Emotion::Surprise)
        + WEIGHT_SADNESS * emotions.get(Emotion::Sadness)
        + WEIGHT_SENTIMENT * (1.0 - polarity);

    raw_stress -= positive as f64 * WEIGHT_POSITIVE;

    ScoreResult::new(
        raw_stress / STRESS_DIVISOR,
        KeywordMatches {
            high,
            medium,
            low,
            positive,
            stress_phrases: None,
        },
    )
}
