use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounds::Bounds;
use crate::feature::Feature;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("unknown feature: {0}")]
    UnknownFeature(String),
    #[error("feature listed more than once: {0}")]
    DuplicateFeature(Feature),
    #[error("feature list is empty")]
    EmptyFeatureList,
    #[error("invalid bounds for {feature}: min {min} is greater than max {max}")]
    InvertedBounds { feature: Feature, min: f64, max: f64 },
    #[error("invalid bounds for {feature}: bounds must be finite")]
    NonFiniteBounds { feature: Feature },
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Why a single field of a submission was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// No value supplied for the feature.
    Missing,
    /// The supplied text is not a finite number.
    Unparseable { raw: String },
    /// The value lies outside the inclusive bounds.
    OutOfBounds { value: f64, bounds: Bounds },
    /// The feature was supplied more than once.
    Duplicate,
}

/// A rejected field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub feature: Feature,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{}: missing value", self.feature),
            IssueKind::Unparseable { raw } => {
                write!(f, "{}: '{}' is not a number", self.feature, raw)
            }
            IssueKind::OutOfBounds { value, bounds } => write!(
                f,
                "{}: {} is outside {}-{}",
                self.feature, value, bounds.min, bounds.max
            ),
            IssueKind::Duplicate => write!(f, "{}: supplied more than once", self.feature),
        }
    }
}

/// Every problem found in one submission. Never empty.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("invalid input; check fields: {}", field_list(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    /// Offending features in the order they were reported, without repeats.
    pub fn features(&self) -> Vec<Feature> {
        let mut features = Vec::with_capacity(self.issues.len());
        for issue in &self.issues {
            if !features.contains(&issue.feature) {
                features.push(issue.feature);
            }
        }
        features
    }

    /// Features rejected because no value was supplied.
    pub fn missing(&self) -> Vec<Feature> {
        self.issues
            .iter()
            .filter(|issue| issue.kind == IssueKind::Missing)
            .map(|issue| issue.feature)
            .collect()
    }

    pub fn mentions(&self, feature: Feature) -> bool {
        self.issues.iter().any(|issue| issue.feature == feature)
    }
}

fn field_list(issues: &[FieldIssue]) -> String {
    let mut names: Vec<&str> = Vec::with_capacity(issues.len());
    for issue in issues {
        let name = issue.feature.name();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names.join(", ")
}
