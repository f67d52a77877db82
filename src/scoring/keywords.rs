use strum::{Display, EnumIter};

pub const MOOD_HIGH_RISK: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "want to die",
    "better off dead",
    "harm myself",
    "no point living",
];

pub const MOOD_MEDIUM_RISK: &[&str] = &[
    "hopeless",
    "empty",
    "numb",
    "cant go on",
    "can't go on",
    "cant cope",
    "can't cope",
    "overwhelmed",
    "dont care anymore",
    "don't care anymore",
    "worthless",
];

pub const MOOD_LOW_RISK: &[&str] = &[
    "sad",
    "unhappy",
    "down",
    "tired",
    "sleepy",
    "lonely",
    "alone",
    "exhausted",
    "drained",
];

pub const STRESS_HIGH: &[&str] = &[
    "overwhelmed",
    "cant handle",
    "can't handle",
    "breaking down",
    "too much pressure",
    "too much on my plate",
    "drowning",
    "panic",
];

pub const STRESS_MEDIUM: &[&str] = &[
    "stressed",
    "anxious",
    "worried",
    "pressure",
    "nervous",
    "tense",
    "deadline",
];

pub const STRESS_LOW: &[&str] = &["busy", "tired", "concerned", "apprehensive"];

pub const POSITIVE_MITIGATION: &[&str] = &[
    "i'll be fine",
    "ill be fine",
    "handling it",
    "mostly",
    "managing",
    "coping well",
    "under control",
    "getting better",
    "feeling better",
    "i'm okay",
    "im okay",
    "prepared",
    "confident",
    "excited",
    "grateful",
    "hopeful",
    "proud",
    "optimistic",
];

/// A tier of one of the three lexicons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum LexiconCategory {
    #[strum(serialize = "mood/high_risk")]
    MoodHighRisk,
    #[strum(serialize = "mood/medium_risk")]
    MoodMediumRisk,
    #[strum(serialize = "mood/low_risk")]
    MoodLowRisk,
    #[strum(serialize = "stress/high")]
    StressHigh,
    #[strum(serialize = "stress/medium")]
    StressMedium,
    #[strum(serialize = "stress/low")]
    StressLow,
    #[strum(serialize = "positive")]
    Positive,
}

impl LexiconCategory {
    pub fn phrases(&self) -> &'static [&'static str] {
        match self {
            Self::MoodHighRisk => MOOD_HIGH_RISK,
            Self::MoodMediumRisk => MOOD_MEDIUM_RISK,
            Self::MoodLowRisk => MOOD_LOW_RISK,
            Self::StressHigh => STRESS_HIGH,
            Self::StressMedium => STRESS_MEDIUM,
            Self::StressLow => STRESS_LOW,
            Self::Positive => POSITIVE_MITIGATION,
        }
    }
}

/// Number of phrases in `category` that occur in `text`, case-insensitively.
///
/// Each phrase counts at most once, and phrases that overlap (`"pressure"` inside
/// `"too much pressure"`) are counted independently.
pub fn count(text: &str, category: LexiconCategory) -> usize {
    count_lowered(&text.to_lowercase(), category)
}

/// Same as [`count`] for text that is already lowercased.
pub fn count_lowered(text_lower: &str, category: LexiconCategory) -> usize {
    category
        .phrases()
        .iter()
        .filter(|phrase| text_lower.contains(*phrase))
        .count()
}

pub fn contains_any(text_lower: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text_lower.contains(p))
}

pub fn has_positive_mitigation(text_lower: &str) -> bool {
    contains_any(text_lower, POSITIVE_MITIGATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_case_insensitive() {
        assert_eq!(count("I am so TIRED and Sad", LexiconCategory::MoodLowRisk), 2);
    }

    #[test]
    fn test_repeated_phrase_counts_once() {
        assert_eq!(
            count("busy busy busy, so busy", LexiconCategory::StressLow),
            1
        );
    }

    #[test]
    fn test_overlapping_phrases_count_independently() {
        let text = "there is too much pressure at work";
        assert_eq!(count(text, LexiconCategory::StressHigh), 1);
        assert_eq!(count(text, LexiconCategory::StressMedium), 1);

        let text = "I can't cope, I can't go on";
        assert_eq!(count(text, LexiconCategory::MoodMediumRisk), 2);
    }

    #[test]
    fn test_substring_containment_not_tokenized() {
        // "sad" matches inside "crusade"; intentional, weights are calibrated on it
        assert_eq!(count("on a crusade", LexiconCategory::MoodLowRisk), 1);
    }

    #[test]
    fn test_no_matches() {
        assert_eq!(count("", LexiconCategory::Positive), 0);
        assert_eq!(
            count("The weather was nice today", LexiconCategory::MoodHighRisk),
            0
        );
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(LexiconCategory::StressMedium.to_string(), "stress/medium");
        assert_eq!(LexiconCategory::MoodHighRisk.to_string(), "mood/high_risk");
    }

    #[test]
    fn test_positive_mitigation() {
        assert!(has_positive_mitigation("i'll be fine, mostly"));
        assert!(!has_positive_mitigation("everything is awful"));
    }
}
