//! Inclusive per-feature value ranges accepted for a submission.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{IssueKind, ModelError, Result};
use crate::feature::Feature;

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Range used for features without a configured entry.
    pub const FALLBACK: Bounds = Bounds {
        min: 0.0,
        max: 9999.0,
    };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Clamp into the range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Bounds per feature. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsTable {
    entries: BTreeMap<Feature, Bounds>,
}

impl Default for BoundsTable {
    fn default() -> Self {
        let entries = BTreeMap::from([
            (Feature::Glucose, Bounds::new(50.0, 300.0)),
            (Feature::BloodPressure, Bounds::new(40.0, 200.0)),
            (Feature::Insulin, Bounds::new(15.0, 900.0)),
            (Feature::Bmi, Bounds::new(10.0, 70.0)),
            (Feature::Age, Bounds::new(1.0, 120.0)),
        ]);
        Self { entries }
    }
}

impl BoundsTable {
    /// Build a table, rejecting inverted or non-finite ranges.
    pub fn new(entries: impl IntoIterator<Item = (Feature, Bounds)>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for (feature, bounds) in entries {
            check_bounds(feature, bounds)?;
            table.insert(feature, bounds);
        }
        Ok(Self { entries: table })
    }

    /// Copy of this table with `overrides` replacing individual entries.
    pub fn merged(&self, overrides: impl IntoIterator<Item = (Feature, Bounds)>) -> Result<Self> {
        let mut entries = self.entries.clone();
        for (feature, bounds) in overrides {
            check_bounds(feature, bounds)?;
            entries.insert(feature, bounds);
        }
        Ok(Self { entries })
    }

    /// Bounds for `feature`, falling back to [`Bounds::FALLBACK`].
    pub fn get(&self, feature: Feature) -> Bounds {
        self.entries
            .get(&feature)
            .copied()
            .unwrap_or(Bounds::FALLBACK)
    }

    /// Whether `feature` has an explicit entry.
    pub fn is_configured(&self, feature: Feature) -> bool {
        self.entries.contains_key(&feature)
    }

    /// Classify a parsed value; `None` means it is acceptable.
    pub fn check(&self, feature: Feature, value: f64) -> Option<IssueKind> {
        let bounds = self.get(feature);
        if bounds.contains(value) {
            None
        } else {
            Some(IssueKind::OutOfBounds { value, bounds })
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, Bounds)> + '_ {
        self.entries.iter().map(|(feature, bounds)| (*feature, *bounds))
    }
}

fn check_bounds(feature: Feature, bounds: Bounds) -> Result<()> {
    if !bounds.min.is_finite() || !bounds.max.is_finite() {
        return Err(ModelError::NonFiniteBounds { feature });
    }
    if bounds.min > bounds.max {
        return Err(ModelError::InvertedBounds {
            feature,
            min: bounds.min,
            max: bounds.max,
        });
    }
    Ok(())
}
