//! Prediction results and the risk tiers derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vector::FeatureVector;

/// Probability at or above which the positive class is predicted.
pub const DECISION_THRESHOLD: f64 = 0.5;
/// Lower edge of the high risk tier.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
/// Lower edge of the moderate risk tier.
pub const MODERATE_RISK_THRESHOLD: f64 = 0.4;

/// Binary outcome label, encoded as 0/1 in data and JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Outcome {
    NoDiabetes,
    Diabetes,
}

impl Outcome {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= DECISION_THRESHOLD {
            Outcome::Diabetes
        } else {
            Outcome::NoDiabetes
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Outcome::NoDiabetes => 0,
            Outcome::Diabetes => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_u8())
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::NoDiabetes => "No Diabetes",
            Outcome::Diabetes => "Diabetes",
        }
    }
}

impl From<Outcome> for u8 {
    fn from(outcome: Outcome) -> Self {
        outcome.as_u8()
    }
}

impl TryFrom<u8> for Outcome {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Outcome::NoDiabetes),
            1 => Ok(Outcome::Diabetes),
            other => Err(format!("outcome must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Class and probability for one submission.
///
/// The class is derived from the probability, so the two always agree:
/// `Diabetes` iff `probability >= 0.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    predicted_class: Outcome,
    probability: f64,
}

impl PredictionResult {
    /// Build a result from a positive-class probability in `[0, 1]`.
    ///
    /// Returns `None` for NaN or values outside the unit interval.
    pub fn from_probability(probability: f64) -> Option<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return None;
        }
        Some(Self {
            predicted_class: Outcome::from_probability(probability),
            probability,
        })
    }

    pub fn predicted_class(&self) -> Outcome {
        self.predicted_class
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Probability as a percentage.
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }

    pub fn tier(&self) -> RiskTier {
        RiskTier::from_probability(self.probability)
    }
}

/// Display band for a probability. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Lower edges are closed; only the top tier has no upper edge.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if probability >= MODERATE_RISK_THRESHOLD {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Moderate => "Moderate Risk",
            RiskTier::High => "High Risk",
        }
    }

    /// Threshold band description shown next to the risk score.
    pub fn band(self) -> &'static str {
        match self {
            RiskTier::Low => "Below 40%",
            RiskTier::Moderate => "Between 40% and 70%",
            RiskTier::High => "Above 70%",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A result together with the input that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    input: FeatureVector,
    result: PredictionResult,
}

impl Prediction {
    pub fn new(input: FeatureVector, result: PredictionResult) -> Self {
        Self { input, result }
    }

    pub fn input(&self) -> &FeatureVector {
        &self.input
    }

    pub fn result(&self) -> PredictionResult {
        self.result
    }

    pub fn probability(&self) -> f64 {
        self.result.probability()
    }

    pub fn predicted_class(&self) -> Outcome {
        self.result.predicted_class()
    }

    pub fn tier(&self) -> RiskTier {
        self.result.tier()
    }
}
