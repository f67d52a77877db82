mod classification;
pub mod emotion;
pub mod feelings;
pub mod filters;
pub mod keywords;
pub mod mood;
pub mod oracle;
pub mod pipeline;
pub mod recommendations;
pub mod score;
pub mod stress;

pub use classification::MLHandle;
pub use emotion::{Emotion, EmotionDistribution, EmotionSource};
pub use feelings::{Feeling, SecondaryFeelings};
pub use filters::{apply_filters, is_intelligible, Filter, FilterResult};
pub use keywords::LexiconCategory;
pub use mood::{MoodLevel, MoodScore};
pub use oracle::{EmotionCapability, EmotionOracle, NeutralSentiment, SentimentOracle};
pub use pipeline::{AnalyzeError, Analyzer, CheckInAnalysis};
pub use score::{KeywordMatches, ScoreLevel, ScoreResult};
pub use stress::{StressLevel, StressScore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_min_length() {
        let result = apply_filters("hi");
        assert!(matches!(result, FilterResult::Reject(Filter::MinLength)));
    }

    #[test]
    fn test_offline_analyzer_scores_valid_text() {
        let analysis = Analyzer::offline()
            .analyze("Exam went okay, a little stressed about the next one")
            .unwrap();
        assert_eq!(analysis.stress.keyword_matches.medium, 1);
        assert_eq!(analysis.dominant_emotion, Emotion::Neutral);
    }

    #[test]
    fn test_every_lexicon_category_is_non_empty() {
        use strum::IntoEnumIterator;
        for category in LexiconCategory::iter() {
            assert!(!category.phrases().is_empty(), "{category} is empty");
        }
    }
}
