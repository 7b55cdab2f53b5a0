use std::path::PathBuf;

use chrono::NaiveDate;
use gt_explain::LinearExplainer;
use gt_ingest::{IngestOptions, load_dataset};
use gt_model::{Bounds, BoundsTable, Dataset, Feature, FeatureVector, MODEL_FEATURES, Prediction};
use gt_predict::PredictionPipeline;
use gt_report::{
    Overview, PatientIdentity, PatientReport, ReportFormat, ReportOptions, adjustment_range,
    compare_with_classes, feature_impact, radar_profile,
};
use gt_risk::{Classifier, RiskModel};
use lopdf::content::Content;
use lopdf::{Document, Object};

struct Fixed(f64);

impl Classifier for Fixed {
    fn features(&self) -> &[Feature] {
        &MODEL_FEATURES
    }

    fn predict_proba(&self, _input: &FeatureVector) -> gt_risk::Result<f64> {
        Ok(self.0)
    }
}

fn sample() -> Dataset {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/diabetes_sample.csv");
    load_dataset(&path, &IngestOptions::default()).expect("load sample")
}

fn example_values() -> Vec<(Feature, f64)> {
    vec![
        (Feature::Glucose, 150.0),
        (Feature::BloodPressure, 80.0),
        (Feature::Insulin, 100.0),
        (Feature::Bmi, 28.0),
        (Feature::Age, 45.0),
    ]
}

fn stub_prediction() -> Prediction {
    let model = Fixed(0.55);
    let bounds = BoundsTable::default();
    PredictionPipeline::new(&model, &bounds)
        .submit_values(&example_values())
        .unwrap()
}

fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .and_then(|date| date.and_hms_opt(9, 26, 53))
        .unwrap()
}

/// Text shown by `Tj` operators, one entry per operator, in page order.
fn pdf_strings(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("parse pdf");
    let mut strings = Vec::new();
    for page_id in doc.get_pages().values() {
        let content = Content::decode(&doc.get_page_content(*page_id).unwrap()).unwrap();
        for operation in &content.operations {
            if operation.operator == "Tj" {
                for operand in &operation.operands {
                    if let Object::String(bytes, _) = operand {
                        strings.push(bytes.iter().map(|byte| *byte as char).collect());
                    }
                }
            }
        }
    }
    strings
}

#[test]
fn overview_of_sample() {
    let overview = Overview::build(&sample());
    assert_eq!(overview.total, 40);
    assert_eq!(overview.positives, 22);
    assert_eq!(overview.positive_rate, Some(0.55));
    assert_eq!(overview.mean_glucose, Some(125.375));

    let counts: Vec<(usize, usize)> = overview
        .by_age_group
        .iter()
        .map(|group| (group.count, group.positives))
        .collect();
    assert_eq!(counts, vec![(12, 4), (12, 7), (7, 5), (9, 6)]);
    for group in &overview.by_age_group {
        let (low, high) = group.interval.unwrap();
        let rate = group.rate.unwrap();
        assert!(low <= rate && rate <= high);
    }
    assert_eq!(overview.summary.len(), 8);
    let (_, glucose) = overview.summary[1];
    assert_eq!(glucose.count, 40);
}

#[test]
fn analytics_compare_against_class_means() {
    let dataset = sample();
    let prediction = stub_prediction();
    let comparison = compare_with_classes(&dataset, prediction.input());
    assert_eq!(comparison.len(), 5);
    assert_eq!(comparison[0].feature, Feature::Glucose);
    assert_eq!(comparison[0].input, 150.0);
    assert!(comparison[0].diabetic_mean.unwrap() > comparison[0].non_diabetic_mean.unwrap());

    let radar = radar_profile(&dataset, prediction.input());
    let glucose = dataset.observed_range(Feature::Glucose).unwrap();
    let expected = (150.0 - glucose.min) / (glucose.max - glucose.min);
    assert!((radar[0].1 - expected).abs() < 1e-12);
}

#[test]
fn impact_tester_clamps_to_observed_range() {
    let dataset = sample();
    let model = RiskModel::fit(&dataset, &MODEL_FEATURES, Default::default()).unwrap();
    let bounds = BoundsTable::default();
    let pipeline = PredictionPipeline::new(&model, &bounds);
    let base = pipeline.submit_values(&example_values()).unwrap();

    let glucose = dataset.observed_range(Feature::Glucose).unwrap();
    let test = feature_impact(&pipeline, &dataset, &base, &[(Feature::Glucose, 299.0)]).unwrap();
    assert_eq!(test.clamped, vec![Feature::Glucose]);
    assert_eq!(test.prediction.input().get(Feature::Glucose), Some(glucose.max));
    assert_eq!(test.prediction.input().get(Feature::Age), Some(45.0));
    assert!(test.delta() > 0.0);

    let unchanged = feature_impact(&pipeline, &dataset, &base, &[]).unwrap();
    assert!(unchanged.clamped.is_empty());
    assert_eq!(unchanged.delta(), 0.0);
}

#[test]
fn impact_tester_stays_within_submission_bounds() {
    let dataset = sample();
    let model = RiskModel::fit(&dataset, &MODEL_FEATURES, Default::default()).unwrap();
    let bounds = BoundsTable::default();
    let pipeline = PredictionPipeline::new(&model, &bounds);
    let base = pipeline.submit_values(&example_values()).unwrap();

    // The sample's lowest blood pressure (30) is below the accepted 40.
    let observed = dataset.observed_range(Feature::BloodPressure).unwrap();
    assert!(observed.min < bounds.get(Feature::BloodPressure).min);
    let range = adjustment_range(&pipeline, &dataset, Feature::BloodPressure);
    assert_eq!(range, Bounds::new(40.0, observed.max));

    let test = feature_impact(
        &pipeline,
        &dataset,
        &base,
        &[(Feature::BloodPressure, observed.min)],
    )
    .unwrap();
    assert_eq!(test.clamped, vec![Feature::BloodPressure]);
    assert_eq!(test.prediction.input().get(Feature::BloodPressure), Some(40.0));

    let inside = feature_impact(&pipeline, &dataset, &base, &[(Feature::BloodPressure, 60.0)])
        .unwrap();
    assert!(inside.clamped.is_empty());
    assert_eq!(inside.prediction.input().get(Feature::BloodPressure), Some(60.0));
}

#[test]
fn json_report_snapshot() {
    let report = PatientReport::new(
        &stub_prediction(),
        PatientIdentity::new(Some("Jane Citizen"), None),
        None,
        Some("abc123"),
        &ReportOptions::default(),
        timestamp(),
    );
    insta::assert_snapshot!(report.to_json().unwrap(), @r#"
    {
      "organization": "Bangladesh Medical Society of Victoria",
      "title": "Diabetes Risk Report",
      "generated_at": "2025-03-14 09:26:53",
      "patient": {
        "name": "Jane Citizen",
        "id": null
      },
      "details": [
        [
          "Glucose",
          150.0
        ],
        [
          "BloodPressure",
          80.0
        ],
        [
          "Insulin",
          100.0
        ],
        [
          "BMI",
          28.0
        ],
        [
          "Age",
          45.0
        ]
      ],
      "outcome": 1,
      "outcome_label": "Diabetes",
      "probability": 0.55,
      "confidence": "55.00%",
      "tier": "Moderate",
      "recommendation": "High risk of diabetes detected. Recommend clinical testing, healthy diet, and exercise.",
      "attribution": null,
      "base_value": null,
      "dataset_fingerprint": "abc123",
      "footer": "© Bangladesh Medical Society of Victoria | https://bmsvictoria.org.au"
    }
    "#);
}

#[test]
fn pdf_report_round_trips_through_lopdf() {
    let dataset = sample();
    let model = RiskModel::fit(&dataset, &MODEL_FEATURES, Default::default()).unwrap();
    let explainer = LinearExplainer::new(&model, &dataset).unwrap();
    let prediction = stub_prediction();
    let attribution = explainer.attribute(prediction.input()).unwrap();

    let report = PatientReport::new(
        &prediction,
        PatientIdentity::new(Some("Jane Citizen"), Some("P-0042")),
        Some(&attribution),
        Some(dataset.fingerprint()),
        &ReportOptions::default(),
        timestamp(),
    );
    let strings = pdf_strings(&report.to_pdf().unwrap());

    assert_eq!(strings[0], "Bangladesh Medical Society of Victoria");
    assert_eq!(strings[1], "Diabetes Risk Report");
    assert_eq!(strings[2], "Report Generated: 2025-03-14 09:26:53");
    for expected in [
        "Name: Jane Citizen",
        "ID: P-0042",
        "Glucose: 150",
        "BMI: 28",
        "Outcome: Diabetes",
        "Confidence: 55.00%",
        "Risk Tier: Moderate Risk",
        "Doctor's Notes:",
        "Feature Attribution (log-odds):",
    ] {
        assert!(strings.iter().any(|s| s == expected), "missing {expected:?}");
    }
    assert!(strings.iter().any(|s| s.starts_with("High risk of diabetes detected.")));
    assert!(
        strings
            .iter()
            .any(|s| s == &format!("Dataset SHA-256: {}", dataset.fingerprint()))
    );
    assert_eq!(
        strings.last().map(String::as_str),
        Some("© Bangladesh Medical Society of Victoria | https://bmsvictoria.org.au")
    );
}

#[test]
fn reports_are_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let report = PatientReport::new(
        &stub_prediction(),
        PatientIdentity::default(),
        None,
        None,
        &ReportOptions::default(),
        timestamp(),
    );
    let pdf = dir.path().join("report.pdf");
    report.write(&pdf, ReportFormat::Pdf).unwrap();
    let strings = pdf_strings(&std::fs::read(&pdf).unwrap());
    assert!(!strings.iter().any(|s| s == "Patient Identification:"));

    let json = dir.path().join("report.json");
    report.write(&json, ReportFormat::Json).unwrap();
    let value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&json).unwrap()).unwrap();
    assert_eq!(value["confidence"], "55.00%");

    let missing = dir.path().join("absent").join("report.pdf");
    let err = report.write(&missing, ReportFormat::Pdf).unwrap_err();
    assert!(err.to_string().contains("absent"));
}
