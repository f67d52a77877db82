use anyhow::Result;
use std::sync::Arc;

use super::emotion::EmotionDistribution;

/// Scores text against the fixed emotion labels, 0-100 per label.
pub trait EmotionOracle: Send + Sync {
    fn classify(&self, text: &str) -> Result<EmotionDistribution>;
}

/// Sentiment polarity of text in [-1, 1].
pub trait SentimentOracle: Send + Sync {
    fn polarity(&self, text: &str) -> Result<f64>;
}

#[derive(Clone)]
pub enum EmotionCapability {
    Available(Arc<dyn EmotionOracle>),
    Unavailable,
}

impl EmotionCapability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Used when no sentiment model is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralSentiment;

impl SentimentOracle for NeutralSentiment {
    fn polarity(&self, _: &str) -> Result<f64> {
        Ok(0.0)
    }
}
