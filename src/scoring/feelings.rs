use serde::Serialize;
use std::collections::BTreeMap;
use strum::Display;

use super::emotion::{Emotion, EmotionDistribution};
use super::keywords::contains_any;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Feeling {
    Lonely,
    Disappointed,
    Despair,
    Frustrated,
    Mad,
    Anxious,
    Scared,
    Optimistic,
    Peaceful,
    Disgust,
    Surprise,
    Neutral,
}

impl Feeling {
    /// Coarse emotions that survive into the feeling map unchanged.
    pub fn carried_over(emotion: Emotion) -> Option<Self> {
        match emotion {
            Emotion::Disgust => Some(Self::Disgust),
            Emotion::Surprise => Some(Self::Surprise),
            Emotion::Neutral => Some(Self::Neutral),
            Emotion::Sadness | Emotion::Anger | Emotion::Fear | Emotion::Joy => None,
        }
    }
}

struct FeelingRule {
    dominant: Emotion,
    /// Empty triggers always match.
    triggers: &'static [&'static str],
    feeling: Feeling,
    scale: f64,
}

/// Per dominant emotion, the first rule whose triggers match wins.
const FEELING_RULES: &[FeelingRule] = &[
    FeelingRule {
        dominant: Emotion::Sadness,
        triggers: &["lonely", "alone"],
        feeling: Feeling::Lonely,
        scale: 0.9,
    },
    FeelingRule {
        dominant: Emotion::Sadness,
        triggers: &["disappoint", "fed up", "not working", "drained"],
        feeling: Feeling::Disappointed,
        scale: 0.9,
    },
    FeelingRule {
        dominant: Emotion::Sadness,
        triggers: &[],
        feeling: Feeling::Despair,
        scale: 0.7,
    },
    FeelingRule {
        dominant: Emotion::Anger,
        triggers: &["fed up", "not working", "project"],
        feeling: Feeling::Frustrated,
        scale: 0.95,
    },
    FeelingRule {
        dominant: Emotion::Anger,
        triggers: &["threat", "mad"],
        feeling: Feeling::Mad,
        scale: 0.8,
    },
    FeelingRule {
        dominant: Emotion::Fear,
        triggers: &["anxious", "worried", "deadline", "overwhelmed"],
        feeling: Feeling::Anxious,
        scale: 0.95,
    },
    FeelingRule {
        dominant: Emotion::Fear,
        triggers: &[],
        feeling: Feeling::Scared,
        scale: 0.7,
    },
    FeelingRule {
        dominant: Emotion::Joy,
        triggers: &["optimistic", "proud"],
        feeling: Feeling::Optimistic,
        scale: 0.95,
    },
    FeelingRule {
        dominant: Emotion::Joy,
        triggers: &[],
        feeling: Feeling::Peaceful,
        scale: 0.7,
    },
];

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct SecondaryFeelings(BTreeMap<Feeling, f64>);

impl SecondaryFeelings {
    pub fn get(&self, feeling: Feeling) -> Option<f64> {
        self.0.get(&feeling).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feeling, f64)> + '_ {
        self.0.iter().map(|(f, v)| (*f, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Replaces the coarse sadness/anger/fear/joy entries with a finer feeling chosen
/// from the dominant emotion and the wording of `text`.
///
/// The four coarse keys are always dropped. When the dominant emotion is anger and
/// none of its triggers match, nothing replaces it.
pub fn map_emotions_to_feelings(
    text: &str,
    distribution: &EmotionDistribution,
    dominant: Emotion,
) -> SecondaryFeelings {
    let text_lower = text.to_lowercase();

    let mut feelings: BTreeMap<Feeling, f64> = distribution
        .iter()
        .filter_map(|(emotion, score)| Feeling::carried_over(emotion).map(|f| (f, score)))
        .collect();

    let rule = FEELING_RULES
        .iter()
        .filter(|r| r.dominant == dominant)
        .find(|r| r.triggers.is_empty() || contains_any(&text_lower, r.triggers));

    if let Some(rule) = rule {
        feelings.insert(rule.feeling, distribution.get(dominant) * rule.scale);
    }

    SecondaryFeelings(feelings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmotionDistribution {
        EmotionDistribution::from_pairs(&[
            (Emotion::Sadness, 40.0),
            (Emotion::Anger, 20.0),
            (Emotion::Fear, 60.0),
            (Emotion::Joy, 10.0),
            (Emotion::Disgust, 3.0),
            (Emotion::Surprise, 2.0),
            (Emotion::Neutral, 5.0),
        ])
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn test_sadness_lonely() {
        let f = map_emotions_to_feelings("I feel so alone lately", &sample(), Emotion::Sadness);
        assert!(approx(f.get(Feeling::Lonely), 36.0));
        assert_eq!(f.get(Feeling::Despair), None);
    }

    #[test]
    fn test_sadness_disappointed() {
        let f = map_emotions_to_feelings(
            "the plan is not working",
            &sample(),
            Emotion::Sadness,
        );
        assert!(approx(f.get(Feeling::Disappointed), 36.0));
    }

    #[test]
    fn test_sadness_despair_default() {
        let f = map_emotions_to_feelings("it rained all day", &sample(), Emotion::Sadness);
        assert!(approx(f.get(Feeling::Despair), 28.0));
    }

    #[test]
    fn test_anger_frustrated() {
        let f = map_emotions_to_feelings("this project again", &sample(), Emotion::Anger);
        assert!(approx(f.get(Feeling::Frustrated), 19.0));
    }

    #[test]
    fn test_anger_mad() {
        let f = map_emotions_to_feelings("I am so mad at them", &sample(), Emotion::Anger);
        assert!(approx(f.get(Feeling::Mad), 16.0));
    }

    #[test]
    fn test_anger_without_trigger_drops_signal() {
        let f = map_emotions_to_feelings("what a day", &sample(), Emotion::Anger);
        assert_eq!(f.get(Feeling::Frustrated), None);
        assert_eq!(f.get(Feeling::Mad), None);
        assert_eq!(f.len(), 3);
    }

    #[test]
    fn test_fear_anxious_and_scared() {
        let f = map_emotions_to_feelings("big deadline tomorrow", &sample(), Emotion::Fear);
        assert!(approx(f.get(Feeling::Anxious), 57.0));

        let f = map_emotions_to_feelings("a noise outside", &sample(), Emotion::Fear);
        assert!(approx(f.get(Feeling::Scared), 42.0));
    }

    #[test]
    fn test_joy_optimistic_and_peaceful() {
        let f = map_emotions_to_feelings("so proud of myself", &sample(), Emotion::Joy);
        assert!(approx(f.get(Feeling::Optimistic), 9.5));

        let f = map_emotions_to_feelings("quiet walk by the lake", &sample(), Emotion::Joy);
        assert!(approx(f.get(Feeling::Peaceful), 7.0));
    }

    #[test]
    fn test_coarse_keys_removed_others_kept() {
        let f = map_emotions_to_feelings("quiet walk by the lake", &sample(), Emotion::Joy);
        assert_eq!(f.get(Feeling::Disgust), Some(3.0));
        assert_eq!(f.get(Feeling::Surprise), Some(2.0));
        assert_eq!(f.get(Feeling::Neutral), Some(5.0));
        assert_eq!(f.len(), 4);
    }

    #[test]
    fn test_neutral_dominant_adds_nothing() {
        let f = map_emotions_to_feelings(
            "lonely and proud",
            &EmotionDistribution::neutral(),
            Emotion::Neutral,
        );
        assert_eq!(f.len(), 3);
        assert_eq!(f.get(Feeling::Neutral), Some(100.0));
    }

    #[test]
    fn test_serializes_lowercase_keys() {
        let f = map_emotions_to_feelings("so alone", &sample(), Emotion::Sadness);
        let json = serde_json::to_value(&f).unwrap();
        assert!(json.get("lonely").is_some());
        assert!(json.get("sadness").is_none());
    }
}
