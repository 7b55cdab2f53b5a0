//! Categorical bins derived from imputed values, used by the overview views.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Age band. Intervals are right-closed; the lowest includes 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "20-29")]
    Twenties,
    #[serde(rename = "30-39")]
    Thirties,
    #[serde(rename = "40-49")]
    Forties,
    #[serde(rename = "50+")]
    FiftyPlus,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Twenties,
        AgeGroup::Thirties,
        AgeGroup::Forties,
        AgeGroup::FiftyPlus,
    ];

    /// Band for `age`, or `None` outside `[20, 100]`.
    pub fn of(age: f64) -> Option<Self> {
        if !(20.0..=100.0).contains(&age) {
            None
        } else if age <= 30.0 {
            Some(AgeGroup::Twenties)
        } else if age <= 40.0 {
            Some(AgeGroup::Thirties)
        } else if age <= 50.0 {
            Some(AgeGroup::Forties)
        } else {
            Some(AgeGroup::FiftyPlus)
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Twenties => "20-29",
            AgeGroup::Thirties => "30-39",
            AgeGroup::Forties => "40-49",
            AgeGroup::FiftyPlus => "50+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// BMI category. Intervals are left-closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    #[serde(rename = "Obese I")]
    ObeseI,
    #[serde(rename = "Obese II")]
    ObeseII,
    #[serde(rename = "Severe Obese")]
    SevereObese,
}

impl BmiCategory {
    pub const ALL: [BmiCategory; 6] = [
        BmiCategory::Underweight,
        BmiCategory::Normal,
        BmiCategory::Overweight,
        BmiCategory::ObeseI,
        BmiCategory::ObeseII,
        BmiCategory::SevereObese,
    ];

    /// Category for `bmi`, or `None` outside `[0, 70)`.
    pub fn of(bmi: f64) -> Option<Self> {
        const EDGES: [(f64, BmiCategory); 6] = [
            (18.5, BmiCategory::Underweight),
            (25.0, BmiCategory::Normal),
            (30.0, BmiCategory::Overweight),
            (35.0, BmiCategory::ObeseI),
            (50.0, BmiCategory::ObeseII),
            (70.0, BmiCategory::SevereObese),
        ];
        if bmi.is_nan() || bmi < 0.0 {
            return None;
        }
        EDGES
            .iter()
            .find(|(upper, _)| bmi < *upper)
            .map(|(_, category)| *category)
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObeseI => "Obese I",
            BmiCategory::ObeseII => "Obese II",
            BmiCategory::SevereObese => "Severe Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
