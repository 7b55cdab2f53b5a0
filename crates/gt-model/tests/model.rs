//! Tests for gt-model types.

use std::collections::BTreeMap;

use gt_model::{
    Bounds, BoundsTable, Dataset, Feature, FeatureVector, FieldIssue, IssueKind, Outcome,
    PatientRecord, Prediction, PredictionResult, RiskTier, ValidationError,
};

fn record(glucose: f64, bmi: f64, age: f64, outcome: Outcome) -> PatientRecord {
    PatientRecord::new([1.0, glucose, 70.0, 20.0, 80.0, bmi, 0.5, age], outcome)
}

#[test]
fn validation_error_lists_each_feature_once() {
    let error = ValidationError::new(vec![
        FieldIssue {
            feature: Feature::Age,
            kind: IssueKind::Missing,
        },
        FieldIssue {
            feature: Feature::Glucose,
            kind: IssueKind::Unparseable {
                raw: "abc".to_string(),
            },
        },
        FieldIssue {
            feature: Feature::Age,
            kind: IssueKind::Duplicate,
        },
    ]);
    assert_eq!(error.features(), vec![Feature::Age, Feature::Glucose]);
    assert_eq!(error.missing(), vec![Feature::Age]);
    assert_eq!(
        error.to_string(),
        "invalid input; check fields: Age, Glucose"
    );
}

#[test]
fn field_issue_messages() {
    let issue = FieldIssue {
        feature: Feature::Age,
        kind: IssueKind::OutOfBounds {
            value: 500.0,
            bounds: Bounds::new(1.0, 120.0),
        },
    };
    assert_eq!(issue.to_string(), "Age: 500 is outside 1-120");
}

#[test]
fn validation_error_serializes_with_kind_tag() {
    let error = ValidationError::new(vec![FieldIssue {
        feature: Feature::Bmi,
        kind: IssueKind::Missing,
    }]);
    let json = serde_json::to_value(&error).expect("serialize error");
    assert_eq!(json["issues"][0]["feature"], "BMI");
    assert_eq!(json["issues"][0]["kind"], "missing");
    let round: ValidationError = serde_json::from_value(json).expect("deserialize error");
    assert_eq!(round, error);
}

#[test]
fn prediction_keeps_input_and_result_together() {
    let input = FeatureVector::new(
        vec![(Feature::Glucose, 150.0), (Feature::Age, 45.0)],
        &BoundsTable::default(),
    )
    .expect("valid vector");
    let result = PredictionResult::from_probability(0.55).expect("probability");
    let prediction = Prediction::new(input.clone(), result);
    assert_eq!(prediction.input(), &input);
    assert_eq!(prediction.predicted_class(), Outcome::Diabetes);
    assert_eq!(prediction.tier(), RiskTier::Moderate);

    let json = serde_json::to_value(&prediction).expect("serialize prediction");
    assert_eq!(json["result"]["predicted_class"], 1);
    assert_eq!(json["result"]["probability"], 0.55);
}

#[test]
fn dataset_summaries() {
    let dataset = Dataset::new(
        vec![
            record(100.0, 22.0, 25.0, Outcome::NoDiabetes),
            record(180.0, 36.0, 55.0, Outcome::Diabetes),
            record(120.0, 28.0, 41.0, Outcome::NoDiabetes),
        ],
        BTreeMap::new(),
        BTreeMap::new(),
        "abc",
    );
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.count(Outcome::Diabetes), 1);
    assert_eq!(dataset.class_mean(Feature::Glucose, Outcome::NoDiabetes), Some(110.0));
    assert_eq!(
        dataset.observed_range(Feature::Bmi),
        Some(Bounds::new(22.0, 36.0))
    );
    let rate = dataset.positive_rate().expect("rate");
    assert!((rate - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(
        dataset.rows(&[Feature::Age, Feature::Glucose])[1],
        vec![55.0, 180.0]
    );
    assert_eq!(dataset.imputed_count(Feature::Insulin), 0);
}
