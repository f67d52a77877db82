pub const MAX_RECOMMENDATIONS: usize = 3;

pub const CRISIS_LINE: &str = "🚨 Please reach out right now: call or text 988 (Suicide & Crisis Lifeline), or text HOME to 741741 to talk with someone immediately.";
pub const GROUNDING_EXERCISE: &str = "🧘 Try a grounding exercise: name 5 things you can see, 4 you can touch, 3 you can hear, 2 you can smell and 1 you can taste.";
pub const WORKLOAD_PLANNING: &str = "📅 Your workload sounds heavy. List what's due, pick the single most important task and schedule short breaks between blocks of work.";
pub const TALK_TO_SOMEONE: &str =
    "💬 Consider talking to someone you trust about how you're feeling today.";
pub const SHORT_WALK: &str = "🚶 A short 10-minute walk can help release some of today's tension.";
pub const AFFIRMATION: &str =
    "💚 You're doing well. Keep up the habits that are supporting you.";
pub const MINDFULNESS_FALLBACK: &str =
    "🌿 Take a few minutes for mindful breathing and check in with yourself again later.";

struct RecommendationRule {
    fires: fn(u8, u8) -> bool,
    message: &'static str,
}

/// Every rule is evaluated, in order, against (mood, stress).
const RULES: &[RecommendationRule] = &[
    RecommendationRule {
        fires: |mood, _| mood <= 15,
        message: CRISIS_LINE,
    },
    RecommendationRule {
        fires: |_, stress| stress >= 70,
        message: GROUNDING_EXERCISE,
    },
    RecommendationRule {
        fires: |mood, stress| stress >= 50 && (40..70).contains(&mood),
        message: WORKLOAD_PLANNING,
    },
    RecommendationRule {
        fires: |mood, _| mood > 15 && mood <= 35,
        message: TALK_TO_SOMEONE,
    },
    RecommendationRule {
        fires: |_, stress| (40..70).contains(&stress),
        message: SHORT_WALK,
    },
    RecommendationRule {
        fires: |mood, stress| mood >= 75 && stress < 40,
        message: AFFIRMATION,
    },
];

/// Ordered, deduplicated advice for a mood/stress pair, at most
/// [`MAX_RECOMMENDATIONS`] entries.
pub fn recommend(mood: u8, stress: u8) -> Vec<String> {
    let mut fired: Vec<&'static str> = RULES
        .iter()
        .filter(|rule| (rule.fires)(mood, stress))
        .map(|rule| rule.message)
        .collect();

    if fired.is_empty() {
        fired.push(MINDFULNESS_FALLBACK);
    }

    let mut recommendations: Vec<String> = Vec::with_capacity(MAX_RECOMMENDATIONS);
    for message in fired {
        if !recommendations.iter().any(|r| r == message) {
            recommendations.push(message.to_string());
        }
    }
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}
