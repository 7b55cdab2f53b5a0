use std::path::PathBuf;

use gt_explain::LinearExplainer;
use gt_ingest::{IngestOptions, load_dataset};
use gt_model::{BoundsTable, Dataset, FeatureVector, MODEL_FEATURES};
use gt_risk::{Classifier, ModelParams, RiskModel};
use proptest::prelude::*;

fn sample() -> Dataset {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/diabetes_sample.csv");
    load_dataset(&path, &IngestOptions::default()).expect("load sample")
}

#[test]
fn record_attributions_reproduce_model_output() {
    let dataset = sample();
    let model = RiskModel::fit(&dataset, &MODEL_FEATURES, ModelParams::default()).unwrap();
    let explainer = LinearExplainer::new(&model, &dataset).unwrap();
    assert_eq!(explainer.background_len(), dataset.len());

    // Records may sit outside the submission bounds (BloodPressure 30), so
    // rebuild them under the observed ranges.
    let observed = BoundsTable::default()
        .merged(
            MODEL_FEATURES
                .iter()
                .filter_map(|feature| Some((*feature, dataset.observed_range(*feature)?))),
        )
        .unwrap();
    for index in 0..dataset.len() {
        let attribution = explainer.attribute_record(index).unwrap();
        let input = FeatureVector::new(
            MODEL_FEATURES
                .iter()
                .copied()
                .zip(attribution.values.iter().copied())
                .collect(),
            &observed,
        )
        .unwrap();
        let probability = model.predict_proba(&input).unwrap();
        assert!((attribution.output_probability() - probability).abs() < 1e-9);
        assert!((attribution.output_value - model.logit(&input).unwrap()).abs() < 1e-9);
        assert!(
            (attribution.base_value + attribution.total() - attribution.output_value).abs()
                < 1e-9
        );
    }
}

#[test]
fn contributions_average_to_zero_over_background() {
    let dataset = sample();
    let model = RiskModel::fit(&dataset, &MODEL_FEATURES, ModelParams::default()).unwrap();
    let explainer = LinearExplainer::new(&model, &dataset).unwrap();
    let mut sums = vec![0.0; MODEL_FEATURES.len()];
    for index in 0..dataset.len() {
        let attribution = explainer.attribute_record(index).unwrap();
        for (sum, (_, value)) in sums.iter_mut().zip(&attribution.contributions) {
            *sum += value;
        }
    }
    for sum in sums {
        assert!(sum.abs() < 1e-8);
    }
    let importance = explainer.global_importance();
    assert_eq!(importance.len(), MODEL_FEATURES.len());
    assert!(importance.windows(2).all(|pair| pair[0].1 >= pair[1].1));
}

#[test]
fn attribution_serialises_feature_names() {
    let dataset = sample();
    let model = RiskModel::from_coefficients(&MODEL_FEATURES, -5.0, vec![0.03, 0.0, 0.0, 0.05, 0.0])
        .unwrap();
    let explainer = LinearExplainer::new(&model, &dataset).unwrap();
    let json = serde_json::to_value(explainer.attribute_record(0).unwrap()).unwrap();
    let names: Vec<&str> = json["contributions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| pair[0].as_str().unwrap())
        .collect();
    insta::assert_debug_snapshot!(names, @r#"
    [
        "Glucose",
        "BloodPressure",
        "Insulin",
        "BMI",
        "Age",
    ]
    "#);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn attributions_are_additive(
        glucose in 50.0..=300.0f64,
        pressure in 40.0..=200.0f64,
        insulin in 15.0..=900.0f64,
        bmi in 10.0..=70.0f64,
        age in 1.0..=120.0f64,
    ) {
        let dataset = sample();
        let model = RiskModel::from_coefficients(
            &MODEL_FEATURES,
            -6.0,
            vec![0.035, -0.02, 0.004, 0.1, -0.003],
        ).unwrap();
        let explainer = LinearExplainer::new(&model, &dataset).unwrap();
        let input = FeatureVector::new(
            MODEL_FEATURES.iter().copied().zip([glucose, pressure, insulin, bmi, age]).collect(),
            &BoundsTable::default(),
        ).unwrap();
        let attribution = explainer.attribute(&input).unwrap();
        let logit = model.logit(&input).unwrap();
        prop_assert!((attribution.base_value + attribution.total() - logit).abs() < 1e-9);
        prop_assert!((attribution.output_value - logit).abs() < 1e-9);
    }
}
