use std::path::{Path, PathBuf};

use gt_cli::app::App;
use gt_cli::cli::{AnalyticsArgs, ExplainArgs, ExportArgs, InputArgs, ReportFormatArg};
use gt_cli::commands::{
    report_format, run_analytics, run_explain, run_export, run_overview, run_predict,
    run_recommend, validation_failure,
};
use gt_cli::config::Settings;
use gt_ingest::load_dataset;
use gt_model::{Feature, IssueKind};
use gt_report::ReportFormat;

fn app() -> App {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/diabetes_sample.csv");
    let settings = Settings {
        dataset_path: path,
        ..Settings::default()
    };
    App::load(settings, false).expect("load sample")
}

fn input(pairs: &[(&str, &str)]) -> InputArgs {
    InputArgs {
        set: pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
    }
}

fn example() -> InputArgs {
    input(&[
        ("Glucose", "150"),
        ("BloodPressure", "80"),
        ("Insulin", "100"),
        ("BMI", "28"),
        ("Age", "45"),
    ])
}

fn output(run: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
    let mut buffer = Vec::new();
    run(&mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[test]
fn overview_prints_every_section() {
    let app = app();
    let text = output(|out| run_overview(&app, out));
    for heading in [
        "Dataset overview",
        "Outcome distribution",
        "Diabetes rate by age group (95% CI)",
        "Diabetes rate by pregnancies",
        "Diabetes rate by BMI category",
        "Diabetes rate by Age x BMI",
        "Diabetes rate by Age x Glucose",
        "Summary statistics",
    ] {
        assert!(text.contains(heading), "missing {heading}");
    }
    assert!(text.contains(&format!("Dataset SHA-256: {}", app.dataset.fingerprint())));
}

#[test]
fn example_patient_is_moderate_and_diabetic() {
    let app = app();
    let text = output(|out| run_predict(&app, &example(), out));
    assert!(text.contains("Diabetes"));
    assert!(text.contains("Moderate Risk"));
    assert!(text.contains("Patient is likely diabetic."));

    let text = output(|out| run_recommend(&app, &example(), out));
    assert!(text.starts_with("Moderate Risk: You show some signs of elevated risk."));
}

#[test]
fn invalid_input_is_reported_as_validation_failure() {
    let app = app();
    let mut args = example();
    args.set.retain(|(name, _)| name != "Age");
    args.set.push(("Glucose".to_string(), "abc".to_string()));

    let err = run_predict(&app, &args, &mut Vec::new()).unwrap_err();
    let validation = validation_failure(&err).expect("validation failure");
    assert_eq!(validation.features(), vec![Feature::Glucose, Feature::Age]);
    assert_eq!(
        validation.issues[0].kind,
        IssueKind::Unparseable {
            raw: "abc".to_string()
        }
    );
    assert_eq!(validation.missing(), vec![Feature::Age]);
}

#[test]
fn analytics_include_impact_test() {
    let app = app();
    let args = AnalyticsArgs {
        input: example(),
        adjust: vec![(Feature::Glucose, 100.0)],
    };
    let text = output(|out| run_analytics(&app, &args, out));
    assert!(text.contains("You vs dataset averages"));
    assert!(text.contains("Health profile"));
    assert!(text.contains("Diabetes risk score:"));
    assert!(text.contains("Feature attribution (log-odds)"));
    assert!(text.contains("Feature impact"));
    assert!(!text.contains("Limited to the accepted range"));
}

#[test]
fn explain_covers_records_and_inputs() {
    let app = app();
    let by_record = ExplainArgs {
        input: InputArgs::default(),
        record: Some(0),
    };
    let text = output(|out| run_explain(&app, &by_record, out));
    assert!(text.contains("Global feature importance"));
    assert!(text.contains("Dataset record 0"));

    let out_of_range = ExplainArgs {
        input: InputArgs::default(),
        record: Some(400),
    };
    assert!(run_explain(&app, &out_of_range, &mut Vec::new()).is_err());

    let importance_only = ExplainArgs {
        input: InputArgs::default(),
        record: None,
    };
    let text = output(|out| run_explain(&app, &importance_only, out));
    assert!(!text.contains("Feature attribution"));
}

#[test]
fn export_writes_the_requested_format() {
    let app = app();
    let dir = tempfile::tempdir().unwrap();

    let pdf = ExportArgs {
        input: example(),
        output: dir.path().join("report.pdf"),
        name: Some("Jane Citizen".to_string()),
        patient_id: Some("P-0042".to_string()),
        format: None,
    };
    output(|out| run_export(&app, &pdf, out));
    assert!(std::fs::read(&pdf.output).unwrap().starts_with(b"%PDF"));

    let json = ExportArgs {
        output: dir.path().join("report.txt"),
        format: Some(ReportFormatArg::Json),
        ..pdf
    };
    output(|out| run_export(&app, &json, out));
    let text = std::fs::read_to_string(&json.output).unwrap();
    assert!(text.contains("\"P-0042\""));
    assert!(text.contains(app.dataset.fingerprint()));
}

#[test]
fn report_format_follows_extension() {
    assert_eq!(report_format(Path::new("out.JSON"), None), ReportFormat::Json);
    assert_eq!(report_format(Path::new("out.pdf"), None), ReportFormat::Pdf);
    assert_eq!(report_format(Path::new("out"), None), ReportFormat::Pdf);
    assert_eq!(
        report_format(Path::new("out.json"), Some(ReportFormatArg::Pdf)),
        ReportFormat::Pdf
    );
}
