use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use super::emotion::{resolve_emotions, Emotion, EmotionDistribution, EmotionSource};
use super::feelings::{map_emotions_to_feelings, SecondaryFeelings};
use super::filters::{apply_filters, Filter, FilterResult};
use super::mood::{score_mood, MoodScore};
use super::oracle::{EmotionCapability, NeutralSentiment, SentimentOracle};
use super::recommendations::recommend;
use super::stress::{score_stress, StressScore};
use crate::settings::settings;
use crate::utils::log_oracle_fallback;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("{}", .0.message())]
    Rejected(Filter),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInAnalysis {
    pub mood: MoodScore,
    pub stress: StressScore,
    pub dominant_emotion: Emotion,
    pub emotions: EmotionDistribution,
    pub secondary_feelings: SecondaryFeelings,
    pub recommendations: Vec<String>,
    pub polarity: f64,
    #[serde(skip)]
    pub emotion_source: EmotionSource,
}

/// The analyze entry point. Holds the two oracle capabilities and nothing else,
/// so a single instance can serve concurrent requests.
#[derive(Clone)]
pub struct Analyzer {
    emotions: EmotionCapability,
    sentiment: Arc<dyn SentimentOracle>,
}

impl Analyzer {
    pub fn new(emotions: EmotionCapability, sentiment: Arc<dyn SentimentOracle>) -> Self {
        Self {
            emotions,
            sentiment,
        }
    }

    /// No models: neutral emotions and zero polarity.
    pub fn offline() -> Self {
        Self::new(EmotionCapability::Unavailable, Arc::new(NeutralSentiment))
    }

    pub fn emotions_available(&self) -> bool {
        self.emotions.is_available()
    }

    /// Validates `text` and scores it. Rejected input never reaches an oracle.
    pub fn analyze(&self, text: &str) -> Result<CheckInAnalysis, AnalyzeError> {
        match apply_filters(text) {
            FilterResult::Reject(filter) => Err(AnalyzeError::Rejected(filter)),
            FilterResult::Pass => Ok(self.score(text.trim())),
        }
    }

    /// Scores `text` without validation.
    pub fn score(&self, text: &str) -> CheckInAnalysis {
        let char_limit = settings().analysis.emotion_char_limit;

        let emotions = resolve_emotions(text, &self.emotions, char_limit);
        let polarity = self.polarity(text);

        let mood = score_mood(text, &emotions.distribution, polarity);
        let stress = score_stress(text, &emotions.distribution, polarity);
        let secondary_feelings =
            map_emotions_to_feelings(text, &emotions.distribution, emotions.dominant);
        let recommendations = recommend(mood.score, stress.score);

        CheckInAnalysis {
            mood,
            stress,
            dominant_emotion: emotions.dominant,
            emotions: emotions.distribution,
            secondary_feelings,
            recommendations,
            polarity,
            emotion_source: emotions.source,
        }
    }

    fn polarity(&self, text: &str) -> f64 {
        match self.sentiment.polarity(text) {
            Ok(p) if p.is_finite() => p.clamp(-1.0, 1.0),
            Ok(_) => 0.0,
            Err(e) => {
                log_oracle_fallback("sentiment", &e);
                0.0
            }
        }
    }
}
