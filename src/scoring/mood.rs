use strum::Display;

use super::emotion::{Emotion, EmotionDistribution};
use super::keywords::{count_lowered, LexiconCategory};
use super::score::{KeywordMatches, ScoreLevel, ScoreResult};

pub const WEIGHT_HIGH_RISK: f64 = 100.0;
pub const WEIGHT_MEDIUM_RISK: f64 = 40.0;
pub const WEIGHT_LOW_RISK: f64 = 15.0;

pub const WEIGHT_KEYWORDS: f64 = 0.3;
pub const WEIGHT_SENTIMENT: f64 = 30.0;
pub const WEIGHT_NEGATIVE_EMOTION: f64 = 0.8;

pub const WEIGHT_SADNESS: f64 = 1.5;
pub const WEIGHT_ANGER: f64 = 1.5;
pub const WEIGHT_FEAR: f64 = 0.7;

pub const NEUTRAL_THRESHOLD: f64 = 50.0;
pub const NEUTRAL_POLARITY_CEILING: f64 = 0.5;
pub const WEIGHT_NEUTRAL: f64 = 0.15;

pub const WEIGHT_STRESS_PHRASE: f64 = 25.0;
pub const WEIGHT_POSITIVE: f64 = 40.0;

pub const LOW_MOOD_DIVISOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MoodLevel {
    #[strum(serialize = "GREAT MOOD")]
    Great,
    #[strum(serialize = "GOOD MOOD")]
    Good,
    #[strum(serialize = "NEUTRAL")]
    Neutral,
    #[strum(serialize = "LOW MOOD")]
    Low,
    #[strum(serialize = "VERY LOW MOOD")]
    VeryLow,
}

impl MoodLevel {
    pub const GREAT_THRESHOLD: u8 = 80;
    pub const GOOD_THRESHOLD: u8 = 60;
    pub const NEUTRAL_THRESHOLD: u8 = 40;
    pub const LOW_THRESHOLD: u8 = 20;
}

impl ScoreLevel for MoodLevel {
    fn from_score(score: u8) -> Self {
        if score >= Self::GREAT_THRESHOLD {
            MoodLevel::Great
        } else if score >= Self::GOOD_THRESHOLD {
            MoodLevel::Good
        } else if score >= Self::NEUTRAL_THRESHOLD {
            MoodLevel::Neutral
        } else if score >= Self::LOW_THRESHOLD {
            MoodLevel::Low
        } else {
            MoodLevel::VeryLow
        }
    }

    fn explanation(&self) -> &'static str {
        match self {
            MoodLevel::Great => {
                "🟢 You're in a great place right now. Keep doing what's working for you."
            }
            MoodLevel::Good => "🟢 Your mood looks positive overall.",
            MoodLevel::Neutral => "🟡 Your mood seems balanced, with a mix of ups and downs.",
            MoodLevel::Low => {
                "🟠 Your mood appears low. Be gentle with yourself and consider reaching out to someone."
            }
            MoodLevel::VeryLow => {
                "🔴 Your mood appears very low. Please consider talking to someone you trust or a professional."
            }
        }
    }

    fn label_class(&self) -> &'static str {
        match self {
            MoodLevel::Great => "great-mood",
            MoodLevel::Good => "positive-mood",
            MoodLevel::Neutral => "neutral-mood",
            MoodLevel::Low => "low-mood",
            MoodLevel::VeryLow => "very-low-mood",
        }
    }
}

pub type MoodScore = ScoreResult<MoodLevel>;

/// Rates mood 0-100 (higher is better) from keywords, sentiment and emotions.
pub fn score_mood(text: &str, emotions: &EmotionDistribution, polarity: f64) -> MoodScore {
    let text_lower = text.to_lowercase();

    let high = count_lowered(&text_lower, LexiconCategory::MoodHighRisk);
    let medium = count_lowered(&text_lower, LexiconCategory::MoodMediumRisk);
    let low = count_lowered(&text_lower, LexiconCategory::MoodLowRisk);
    let stress_phrases = count_lowered(&text_lower, LexiconCategory::StressHigh)
        + count_lowered(&text_lower, LexiconCategory::StressMedium);
    let positive = count_lowered(&text_lower, LexiconCategory::Positive);

    let keyword_score = high as f64 * WEIGHT_HIGH_RISK
        + medium as f64 * WEIGHT_MEDIUM_RISK
        + low as f64 * WEIGHT_LOW_RISK;

    let negative_emotion = WEIGHT_SADNESS * emotions.get(Emotion::Sadness)
        + WEIGHT_ANGER * emotions.get(Emotion::Anger)
        + WEIGHT_FEAR * emotions.get(Emotion::Fear);

    let mut raw_low_mood = WEIGHT_KEYWORDS * keyword_score
        + WEIGHT_SENTIMENT * (1.0 - polarity)
        + WEIGHT_NEGATIVE_EMOTION * negative_emotion;

    let neutral = emotions.get(Emotion::Neutral);
    if neutral > NEUTRAL_THRESHOLD && polarity < NEUTRAL_POLARITY_CEILING {
        raw_low_mood += WEIGHT_NEUTRAL * neutral;
    }

    raw_low_mood += stress_phrases as f64 * WEIGHT_STRESS_PHRASE;
    raw_low_mood -= positive as f64 * WEIGHT_POSITIVE;

    let low_mood_score = (raw_low_mood / LOW_MOOD_DIVISOR).clamp(0.0, 100.0);

    ScoreResult::new(
        100.0 - low_mood_score,
        KeywordMatches {
            high,
            medium,
            low,
            positive,
            stress_phrases: Some(stress_phrases),
        },
    )
}
