//! Input checks run before the model sees any value.
//!
//! Every feature is checked and every problem is collected, so the caller
//! can report all offending fields at once. Issues come out in feature order.

use std::collections::BTreeMap;

use gt_model::{BoundsTable, Feature, FeatureVector, FieldIssue, IssueKind, ValidationError};

/// Parse one user-entered value.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Validate a name → text mapping into a vector ordered by `features`.
///
/// Keys are matched after trimming; keys that are not in `features` are
/// ignored. Blank values count as missing.
pub fn validate_raw(
    raw: &BTreeMap<String, String>,
    features: &[Feature],
    bounds: &BoundsTable,
) -> Result<FeatureVector, ValidationError> {
    let mut issues = Vec::new();
    let mut entries = Vec::with_capacity(features.len());
    for &feature in features {
        let mut matches = raw
            .iter()
            .filter(|(key, _)| key.trim() == feature.name())
            .map(|(_, value)| value.trim());
        let kind = match (matches.next(), matches.next()) {
            (None, _) => Some(IssueKind::Missing),
            (Some(_), Some(_)) => Some(IssueKind::Duplicate),
            (Some(""), None) => Some(IssueKind::Missing),
            (Some(text), None) => match parse_value(text) {
                None => Some(IssueKind::Unparseable {
                    raw: text.to_string(),
                }),
                Some(value) => bounds.check(feature, value).or_else(|| {
                    entries.push((feature, value));
                    None
                }),
            },
        };
        if let Some(kind) = kind {
            issues.push(FieldIssue { feature, kind });
        }
    }
    finish(entries, issues, bounds)
}

/// Validate already-typed values into a vector ordered by `features`.
pub fn validate_values(
    values: &[(Feature, f64)],
    features: &[Feature],
    bounds: &BoundsTable,
) -> Result<FeatureVector, ValidationError> {
    let mut issues = Vec::new();
    let mut entries = Vec::with_capacity(features.len());
    for &feature in features {
        let mut matches = values
            .iter()
            .filter(|(candidate, _)| *candidate == feature)
            .map(|(_, value)| *value);
        let kind = match (matches.next(), matches.next()) {
            (None, _) => Some(IssueKind::Missing),
            (Some(_), Some(_)) => Some(IssueKind::Duplicate),
            (Some(value), None) if !value.is_finite() => Some(IssueKind::Unparseable {
                raw: value.to_string(),
            }),
            (Some(value), None) => bounds.check(feature, value).or_else(|| {
                entries.push((feature, value));
                None
            }),
        };
        if let Some(kind) = kind {
            issues.push(FieldIssue { feature, kind });
        }
    }
    finish(entries, issues, bounds)
}

fn finish(
    entries: Vec<(Feature, f64)>,
    issues: Vec<FieldIssue>,
    bounds: &BoundsTable,
) -> Result<FeatureVector, ValidationError> {
    if issues.is_empty() {
        FeatureVector::new(entries, bounds)
    } else {
        Err(ValidationError::new(issues))
    }
}
