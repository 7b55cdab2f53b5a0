use serde::Serialize;

use crate::bounds::BoundsTable;
use crate::error::{FieldIssue, IssueKind, ValidationError};
use crate::feature::Feature;

/// Validated, ordered feature values for one patient.
///
/// The only constructor checks every value against a [`BoundsTable`], so a
/// `FeatureVector` always holds finite, in-bounds values for distinct
/// features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    entries: Vec<(Feature, f64)>,
}

impl FeatureVector {
    /// Validate `entries` exhaustively and keep their order.
    ///
    /// # Errors
    ///
    /// Returns every non-finite, out-of-bounds or duplicated entry.
    pub fn new(
        entries: Vec<(Feature, f64)>,
        bounds: &BoundsTable,
    ) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();
        for (idx, (feature, value)) in entries.iter().enumerate() {
            if entries[..idx].iter().any(|(seen, _)| seen == feature) {
                issues.push(FieldIssue {
                    feature: *feature,
                    kind: IssueKind::Duplicate,
                });
                continue;
            }
            if !value.is_finite() {
                issues.push(FieldIssue {
                    feature: *feature,
                    kind: IssueKind::Unparseable {
                        raw: value.to_string(),
                    },
                });
                continue;
            }
            if let Some(kind) = bounds.check(*feature, *value) {
                issues.push(FieldIssue {
                    feature: *feature,
                    kind,
                });
            }
        }
        if issues.is_empty() {
            Ok(Self { entries })
        } else {
            Err(ValidationError::new(issues))
        }
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.entries.iter().map(|(feature, _)| *feature)
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, value)| *value).collect()
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == feature)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the vector lists exactly `features`, in that order.
    pub fn matches_order(&self, features: &[Feature]) -> bool {
        self.entries.len() == features.len()
            && self
                .entries
                .iter()
                .zip(features)
                .all(|((feature, _), expected)| feature == expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_entry_order() {
        let vector = FeatureVector::new(
            vec![(Feature::Age, 45.0), (Feature::Glucose, 150.0)],
            &BoundsTable::default(),
        )
        .unwrap();
        assert_eq!(
            vector.features().collect::<Vec<_>>(),
            vec![Feature::Age, Feature::Glucose]
        );
        assert_eq!(vector.values(), vec![45.0, 150.0]);
        assert_eq!(vector.get(Feature::Glucose), Some(150.0));
        assert_eq!(vector.get(Feature::Bmi), None);
    }

    #[test]
    fn reports_every_bad_entry() {
        let err = FeatureVector::new(
            vec![
                (Feature::Age, 500.0),
                (Feature::Glucose, f64::INFINITY),
                (Feature::Bmi, 28.0),
                (Feature::Age, 40.0),
            ],
            &BoundsTable::default(),
        )
        .unwrap_err();
        assert_eq!(err.issues.len(), 3);
        assert_eq!(err.features(), vec![Feature::Age, Feature::Glucose]);
        assert_eq!(err.issues[2].kind, IssueKind::Duplicate);
    }
}
