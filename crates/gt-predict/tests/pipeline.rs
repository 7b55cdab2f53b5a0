use std::collections::BTreeMap;
use std::path::PathBuf;

use gt_ingest::{IngestOptions, load_dataset};
use gt_model::{
    BoundsTable, Feature, FeatureVector, IssueKind, MODEL_FEATURES, Outcome, RiskTier,
};
use gt_predict::{PredictError, PredictionPipeline};
use gt_risk::{Classifier, ModelParams, RiskModel};
use proptest::prelude::*;

struct Fixed(f64);

impl Classifier for Fixed {
    fn features(&self) -> &[Feature] {
        &MODEL_FEATURES
    }

    fn predict_proba(&self, _input: &FeatureVector) -> gt_risk::Result<f64> {
        Ok(self.0)
    }
}

fn fitted() -> RiskModel {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/diabetes_sample.csv");
    let dataset = load_dataset(&path, &IngestOptions::default()).expect("load sample");
    RiskModel::fit(&dataset, &MODEL_FEATURES, ModelParams::default()).expect("fit")
}

fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

fn example_input() -> BTreeMap<String, String> {
    raw(&[
        ("Glucose", "150"),
        ("BloodPressure", "80"),
        ("Insulin", "100"),
        ("BMI", "28"),
        ("Age", "45"),
    ])
}

#[test]
fn example_patient_is_classified() {
    let model = fitted();
    let bounds = BoundsTable::default();
    let pipeline = PredictionPipeline::new(&model, &bounds);
    let prediction = pipeline.submit(&example_input()).unwrap();

    let probability = prediction.probability();
    assert!((0.0..=1.0).contains(&probability));
    assert_eq!(
        prediction.predicted_class() == Outcome::Diabetes,
        probability >= 0.5
    );
    assert_eq!(prediction.input().values(), vec![150.0, 80.0, 100.0, 28.0, 45.0]);
    assert_eq!(prediction.tier(), RiskTier::from_probability(probability));
}

#[test]
fn stub_probability_maps_to_moderate_diabetes() {
    let model = Fixed(0.55);
    let bounds = BoundsTable::default();
    let prediction = PredictionPipeline::new(&model, &bounds)
        .submit(&example_input())
        .unwrap();
    assert_eq!(prediction.predicted_class(), Outcome::Diabetes);
    assert_eq!(prediction.tier(), RiskTier::Moderate);
    assert!((prediction.result().percent() - 55.0).abs() < 1e-9);
}

#[test]
fn missing_age_is_named() {
    let model = Fixed(0.3);
    let bounds = BoundsTable::default();
    let mut input = example_input();
    input.remove("Age");
    let err = PredictionPipeline::new(&model, &bounds)
        .submit(&input)
        .unwrap_err();
    let validation = err.validation().expect("validation error");
    assert_eq!(validation.features(), vec![Feature::Age]);
    assert_eq!(validation.missing(), vec![Feature::Age]);
    assert_eq!(err.to_string(), "invalid input; check fields: Age");
}

#[test]
fn implausible_age_is_named() {
    let model = Fixed(0.3);
    let bounds = BoundsTable::default();
    let mut input = example_input();
    input.insert("Age".to_string(), "500".to_string());
    let err = PredictionPipeline::new(&model, &bounds)
        .submit(&input)
        .unwrap_err();
    let validation = err.validation().expect("validation error");
    assert_eq!(validation.features(), vec![Feature::Age]);
    assert!(matches!(
        validation.issues[0].kind,
        IssueKind::OutOfBounds { value: 500.0, .. }
    ));
}

#[test]
fn every_missing_feature_is_named() {
    let model = Fixed(0.3);
    let bounds = BoundsTable::default();
    let input = raw(&[("Insulin", "100"), ("Pregnancies", "3")]);
    let err = PredictionPipeline::new(&model, &bounds)
        .submit(&input)
        .unwrap_err();
    assert!(matches!(err, PredictError::Validation(_)));
    assert_eq!(
        err.validation().map(|v| v.missing()),
        Some(vec![
            Feature::Glucose,
            Feature::BloodPressure,
            Feature::Bmi,
            Feature::Age
        ])
    );
}

#[test]
fn resubmission_is_idempotent() {
    let model = fitted();
    let bounds = BoundsTable::default();
    let pipeline = PredictionPipeline::new(&model, &bounds);
    let first = pipeline.submit(&example_input()).unwrap();
    let second = pipeline.submit(&example_input()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn configured_bounds_are_honoured() {
    let model = Fixed(0.3);
    let bounds = BoundsTable::default()
        .merged([(Feature::Glucose, gt_model::Bounds::new(100.0, 120.0))])
        .unwrap();
    let err = PredictionPipeline::new(&model, &bounds)
        .submit(&example_input())
        .unwrap_err();
    assert_eq!(
        err.validation().map(|v| v.features()),
        Some(vec![Feature::Glucose])
    );
}

fn in_bounds() -> impl Strategy<Value = [f64; 5]> {
    (
        50.0..=300.0f64,
        40.0..=200.0f64,
        15.0..=900.0f64,
        10.0..=70.0f64,
        1.0..=120.0f64,
    )
        .prop_map(|(a, b, c, d, e)| [a, b, c, d, e])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn in_bounds_input_never_fails_validation(values in in_bounds()) {
        let model = Fixed(0.42);
        let bounds = BoundsTable::default();
        let input: BTreeMap<String, String> = MODEL_FEATURES
            .iter()
            .zip(values)
            .map(|(feature, value)| (feature.name().to_string(), value.to_string()))
            .collect();
        let prediction = PredictionPipeline::new(&model, &bounds).submit(&input);
        prop_assert!(prediction.is_ok());
    }

    #[test]
    fn out_of_bounds_feature_is_named(
        values in in_bounds(),
        idx in 0usize..5,
        excess in 0.001..1000.0f64,
        below in any::<bool>(),
    ) {
        let model = Fixed(0.42);
        let bounds = BoundsTable::default();
        let target = MODEL_FEATURES[idx];
        let range = bounds.get(target);
        let mut values = values;
        values[idx] = if below { range.min - excess } else { range.max + excess };
        let entries: Vec<(Feature, f64)> = MODEL_FEATURES.iter().copied().zip(values).collect();
        let err = PredictionPipeline::new(&model, &bounds)
            .submit_values(&entries)
            .unwrap_err();
        prop_assert_eq!(err.validation().map(|v| v.features()), Some(vec![target]));
    }
}
