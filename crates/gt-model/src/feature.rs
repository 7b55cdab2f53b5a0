//! Predictor columns of the patient dataset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A predictor column. Canonical names match the dataset CSV headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feature {
    Pregnancies,
    Glucose,
    BloodPressure,
    SkinThickness,
    Insulin,
    #[serde(rename = "BMI")]
    Bmi,
    DiabetesPedigreeFunction,
    Age,
}

/// Features the risk model is trained on unless configured otherwise.
pub const MODEL_FEATURES: [Feature; 5] = [
    Feature::Glucose,
    Feature::BloodPressure,
    Feature::Insulin,
    Feature::Bmi,
    Feature::Age,
];

impl Feature {
    /// All predictor columns in dataset order.
    pub const ALL: [Feature; 8] = [
        Feature::Pregnancies,
        Feature::Glucose,
        Feature::BloodPressure,
        Feature::SkinThickness,
        Feature::Insulin,
        Feature::Bmi,
        Feature::DiabetesPedigreeFunction,
        Feature::Age,
    ];

    /// Canonical column name.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Pregnancies => "Pregnancies",
            Feature::Glucose => "Glucose",
            Feature::BloodPressure => "BloodPressure",
            Feature::SkinThickness => "SkinThickness",
            Feature::Insulin => "Insulin",
            Feature::Bmi => "BMI",
            Feature::DiabetesPedigreeFunction => "DiabetesPedigreeFunction",
            Feature::Age => "Age",
        }
    }

    /// Position in [`Feature::ALL`].
    pub fn index(self) -> usize {
        match self {
            Feature::Pregnancies => 0,
            Feature::Glucose => 1,
            Feature::BloodPressure => 2,
            Feature::SkinThickness => 3,
            Feature::Insulin => 4,
            Feature::Bmi => 5,
            Feature::DiabetesPedigreeFunction => 6,
            Feature::Age => 7,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.name() == s.trim())
            .ok_or_else(|| ModelError::UnknownFeature(s.to_string()))
    }
}

/// Check that a feature list is non-empty and free of duplicates.
pub fn check_feature_order(features: &[Feature]) -> Result<(), ModelError> {
    if features.is_empty() {
        return Err(ModelError::EmptyFeatureList);
    }
    for (idx, feature) in features.iter().enumerate() {
        if features[..idx].contains(feature) {
            return Err(ModelError::DuplicateFeature(*feature));
        }
    }
    Ok(())
}
