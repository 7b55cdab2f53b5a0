//! The cleaned, in-memory patient table.

use std::collections::BTreeMap;

use crate::bins::{AgeGroup, BmiCategory};
use crate::bounds::Bounds;
use crate::feature::Feature;
use crate::prediction::Outcome;

/// One historical patient after imputation.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    values: [f64; 8],
    pub outcome: Outcome,
    pub age_group: Option<AgeGroup>,
    pub bmi_category: Option<BmiCategory>,
}

impl PatientRecord {
    /// Build a record from values in [`Feature::ALL`] order; bins are derived.
    pub fn new(values: [f64; 8], outcome: Outcome) -> Self {
        Self {
            values,
            outcome,
            age_group: AgeGroup::of(values[Feature::Age.index()]),
            bmi_category: BmiCategory::of(values[Feature::Bmi.index()]),
        }
    }

    pub fn value(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Values for `features`, in that order.
    pub fn row(&self, features: &[Feature]) -> Vec<f64> {
        features.iter().map(|feature| self.value(*feature)).collect()
    }
}

/// Read-only patient table owned by the dataset provider.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<PatientRecord>,
    medians: BTreeMap<Feature, f64>,
    imputed: BTreeMap<Feature, usize>,
    fingerprint: String,
}

impl Dataset {
    pub fn new(
        records: Vec<PatientRecord>,
        medians: BTreeMap<Feature, f64>,
        imputed: BTreeMap<Feature, usize>,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            records,
            medians,
            imputed,
            fingerprint: fingerprint.into(),
        }
    }

    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hex SHA-256 of the source bytes.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Median used to fill missing values of `feature`.
    pub fn median(&self, feature: Feature) -> Option<f64> {
        self.medians.get(&feature).copied()
    }

    /// Number of cells of `feature` that were filled with the median.
    pub fn imputed_count(&self, feature: Feature) -> usize {
        self.imputed.get(&feature).copied().unwrap_or(0)
    }

    pub fn column(&self, feature: Feature) -> Vec<f64> {
        self.records
            .iter()
            .map(|record| record.value(feature))
            .collect()
    }

    /// Outcome labels as 0.0 / 1.0.
    pub fn labels(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|record| record.outcome.as_f64())
            .collect()
    }

    /// Rows of `features` in record order.
    pub fn rows(&self, features: &[Feature]) -> Vec<Vec<f64>> {
        self.records
            .iter()
            .map(|record| record.row(features))
            .collect()
    }

    pub fn mean(&self, feature: Feature) -> Option<f64> {
        mean(self.records.iter().map(|record| record.value(feature)))
    }

    /// Mean of `feature` over records with the given outcome.
    pub fn class_mean(&self, feature: Feature, outcome: Outcome) -> Option<f64> {
        mean(
            self.records
                .iter()
                .filter(|record| record.outcome == outcome)
                .map(|record| record.value(feature)),
        )
    }

    /// Observed minimum and maximum of `feature`.
    pub fn observed_range(&self, feature: Feature) -> Option<Bounds> {
        let mut iter = self.records.iter().map(|record| record.value(feature));
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), value| {
            (min.min(value), max.max(value))
        });
        Some(Bounds::new(min, max))
    }

    /// Share of records with a positive outcome.
    pub fn positive_rate(&self) -> Option<f64> {
        mean(self.records.iter().map(|record| record.outcome.as_f64()))
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.records
            .iter()
            .filter(|record| record.outcome == outcome)
            .count()
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
