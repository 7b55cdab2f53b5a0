//! Lifestyle guidance per risk tier.

use gt_model::{Outcome, RiskTier};
use serde::Serialize;

pub const RECOMMENDATION_DISCLAIMER: &str =
    "These are general lifestyle guidelines and not a substitute for medical advice.";

pub const ANALYTICS_DISCLAIMER: &str = "This risk score is based on a machine learning model \
     trained on population data. It reflects statistical probability, not a clinical diagnosis. \
     For medical concerns, always consult a qualified healthcare provider.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub tier: RiskTier,
    pub headline: &'static str,
    pub actions: &'static [&'static str],
}

const HIGH_ACTIONS: &[&str] = &[
    "Consult a healthcare provider immediately for a full diagnostic assessment.",
    "Adopt a low-sugar, high-fiber diet (e.g., whole grains, legumes, veggies).",
    "Exercise daily (e.g., brisk walking 30+ minutes).",
    "Reduce sodium and processed food intake.",
    "Track weight, glucose, and BMI weekly.",
];

const MODERATE_ACTIONS: &[&str] = &[
    "Maintain a balanced diet with controlled carbs and sugars.",
    "Include 150 mins/week of moderate activity (walking, cycling, swimming).",
    "Consider regular screenings (e.g., fasting glucose tests).",
    "Start a health log: diet, sleep, weight, energy.",
];

const LOW_ACTIONS: &[&str] = &[
    "Keep up healthy habits (plant-based meals, hydration).",
    "Continue physical activity (even light: walking, yoga, stretching).",
    "Reassess every 6-12 months or if symptoms arise.",
    "Encourage peers to screen and stay proactive.",
];

impl Recommendation {
    pub fn for_tier(tier: RiskTier) -> Self {
        match tier {
            RiskTier::High => Self {
                tier,
                headline: "You may be at significant risk of diabetes.",
                actions: HIGH_ACTIONS,
            },
            RiskTier::Moderate => Self {
                tier,
                headline: "You show some signs of elevated risk.",
                actions: MODERATE_ACTIONS,
            },
            RiskTier::Low => Self {
                tier,
                headline: "You are currently within a healthy range.",
                actions: LOW_ACTIONS,
            },
        }
    }

    pub fn for_probability(probability: f64) -> Self {
        Self::for_tier(RiskTier::from_probability(probability))
    }
}

/// One-line advice shown next to the predicted class.
pub fn class_advice(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Diabetes => "Patient is likely diabetic. Please consult a healthcare provider.",
        Outcome::NoDiabetes => "No diabetes detected. Encourage healthy lifestyle practices.",
    }
}

/// Recommendation paragraph printed in the patient report.
pub fn report_recommendation(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Diabetes => {
            "High risk of diabetes detected. Recommend clinical testing, healthy diet, and exercise."
        }
        Outcome::NoDiabetes => {
            "No diabetes risk detected. Maintain a healthy lifestyle and monitor regularly."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_pick_their_advice() {
        let high = Recommendation::for_probability(0.7);
        assert_eq!(high.tier, RiskTier::High);
        assert_eq!(high.actions.len(), 5);
        assert_eq!(Recommendation::for_probability(0.699_999).tier, RiskTier::Moderate);
        assert_eq!(Recommendation::for_probability(0.4).tier, RiskTier::Moderate);
        let low = Recommendation::for_probability(0.399_999);
        assert_eq!(low.tier, RiskTier::Low);
        assert!(low.actions[0].starts_with("Keep up healthy habits"));
    }

    #[test]
    fn moderate_probability_still_reports_diabetes_class() {
        // 0.55 is a Moderate tier but a positive class; both messages apply.
        let outcome = Outcome::from_probability(0.55);
        assert_eq!(outcome, Outcome::Diabetes);
        assert!(report_recommendation(outcome).starts_with("High risk"));
        assert_eq!(
            Recommendation::for_probability(0.55).tier,
            RiskTier::Moderate
        );
    }
}
