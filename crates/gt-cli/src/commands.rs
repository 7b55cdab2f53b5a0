use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use gt_model::{Feature, Prediction, ValidationError};
use gt_predict::PredictError;
use gt_report::{
    Overview, PatientIdentity, PatientReport, ReportFormat, Recommendation, compare_with_classes,
    feature_impact, radar_profile,
};
use tracing::{debug, info, info_span};

use crate::app::App;
use crate::cli::{AnalyticsArgs, Cli, Command, ExplainArgs, ExportArgs, InputArgs, ReportFormatArg};
use crate::config::load_settings;
use crate::logging::redact_value;
use crate::session::run_session;
use crate::summary::{
    render_attribution, render_comparison, render_impact, render_importance, render_overview,
    render_prediction, render_radar, render_recommendation, render_risk_score,
};

/// Load configuration, dataset and model, then run the selected command.
pub fn run(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref(), cli.dataset.as_deref())?;
    let app = App::load(settings, cli.log_data)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Command::Overview => run_overview(&app, &mut out),
        Command::Predict(args) => run_predict(&app, args, &mut out),
        Command::Analytics(args) => run_analytics(&app, args, &mut out),
        Command::Explain(args) => run_explain(&app, args, &mut out),
        Command::Recommend(args) => run_recommend(&app, args, &mut out),
        Command::Export(args) => run_export(&app, args, &mut out),
        Command::Session => run_session(&app, io::stdin().lock(), &mut out),
    }
}

pub fn run_overview(app: &App, out: &mut impl Write) -> Result<()> {
    let overview = Overview::build(&app.dataset);
    writeln!(out, "{}", render_overview(&overview))?;
    writeln!(out, "\nDataset SHA-256: {}", app.dataset.fingerprint())?;
    Ok(())
}

pub fn run_predict(app: &App, args: &InputArgs, out: &mut impl Write) -> Result<()> {
    let prediction = app.predict(&args.set)?;
    write_prediction(out, &prediction)
}

pub fn run_analytics(app: &App, args: &AnalyticsArgs, out: &mut impl Write) -> Result<()> {
    let prediction = app.predict(&args.input.set)?;
    write_analytics(app, out, &prediction, &args.adjust)
}

pub fn run_explain(app: &App, args: &ExplainArgs, out: &mut impl Write) -> Result<()> {
    if let Some(index) = args.record {
        let explainer = app
            .explainer
            .as_ref()
            .ok_or_else(|| anyhow!("explanations are unavailable for this model"))?;
        writeln!(out, "{}\n", render_importance(&explainer.global_importance()))?;
        let attribution = explainer
            .attribute_record(index)
            .with_context(|| format!("explain record {index}"))?;
        writeln!(out, "Dataset record {index}")?;
        writeln!(out, "{}", render_attribution(&attribution))?;
        return Ok(());
    }
    let prediction = if args.input.set.is_empty() {
        None
    } else {
        Some(app.predict(&args.input.set)?)
    };
    write_explanation(app, out, prediction.as_ref())
}

pub fn run_recommend(app: &App, args: &InputArgs, out: &mut impl Write) -> Result<()> {
    let prediction = app.predict(&args.set)?;
    write_recommendation(out, &prediction)
}

pub fn run_export(app: &App, args: &ExportArgs, out: &mut impl Write) -> Result<()> {
    let prediction = app.predict(&args.input.set)?;
    let identity = PatientIdentity::new(args.name.as_deref(), args.patient_id.as_deref());
    let format = report_format(&args.output, args.format);
    let path = export_report(app, &prediction, identity, &args.output, format)?;
    writeln!(out, "Report written to {}", path.display())?;
    Ok(())
}

pub fn write_prediction(out: &mut impl Write, prediction: &Prediction) -> Result<()> {
    writeln!(out, "{}", render_prediction(prediction))?;
    Ok(())
}

pub fn write_recommendation(out: &mut impl Write, prediction: &Prediction) -> Result<()> {
    let recommendation = Recommendation::for_probability(prediction.probability());
    writeln!(out, "{}", render_recommendation(&recommendation))?;
    Ok(())
}

/// Every analytics view for `prediction`, plus an impact test when
/// `adjustments` is non-empty.
pub fn write_analytics(
    app: &App,
    out: &mut impl Write,
    prediction: &Prediction,
    adjustments: &[(Feature, f64)],
) -> Result<()> {
    let comparison = compare_with_classes(&app.dataset, prediction.input());
    writeln!(out, "{}\n", render_comparison(&comparison))?;
    let radar = radar_profile(&app.dataset, prediction.input());
    writeln!(out, "{}\n", render_radar(&radar))?;
    writeln!(out, "{}\n", render_risk_score(prediction))?;
    writeln!(out, "{}", render_prediction(prediction))?;
    if let Some(attribution) = app.attribution(prediction) {
        writeln!(out, "\n{}", render_attribution(&attribution))?;
    }
    if !adjustments.is_empty() {
        let test = feature_impact(&app.pipeline(), &app.dataset, prediction, adjustments)?;
        writeln!(out, "\n{}", render_impact(&test))?;
    }
    Ok(())
}

/// Global importance, then the attribution of `prediction` when given.
pub fn write_explanation(
    app: &App,
    out: &mut impl Write,
    prediction: Option<&Prediction>,
) -> Result<()> {
    let Some(explainer) = app.explainer.as_ref() else {
        writeln!(out, "Explanations are unavailable for this model.")?;
        return Ok(());
    };
    writeln!(out, "{}", render_importance(&explainer.global_importance()))?;
    if let Some(attribution) = prediction.and_then(|prediction| app.attribution(prediction)) {
        writeln!(out, "\n{}", render_attribution(&attribution))?;
    }
    Ok(())
}

/// Write the patient report for `prediction`; returns the path written.
pub fn export_report(
    app: &App,
    prediction: &Prediction,
    identity: PatientIdentity,
    path: &Path,
    format: ReportFormat,
) -> Result<PathBuf> {
    let span = info_span!("export_report", format = format.extension());
    let _guard = span.enter();
    debug!(
        name = redact_value(identity.name.as_deref().unwrap_or(""), app.log_data),
        id = redact_value(identity.id.as_deref().unwrap_or(""), app.log_data),
        "building report"
    );
    let attribution = app.attribution(prediction);
    let report = PatientReport::new(
        prediction,
        identity,
        attribution.as_ref(),
        Some(app.dataset.fingerprint()),
        &app.settings.report,
        Local::now().naive_local(),
    );
    report
        .write(path, format)
        .with_context(|| format!("write report {}", path.display()))?;
    info!(path = %path.display(), "report exported");
    Ok(path.to_path_buf())
}

/// The rejected fields, when `error` is a validation failure.
pub fn validation_failure(error: &anyhow::Error) -> Option<&ValidationError> {
    error
        .downcast_ref::<PredictError>()
        .and_then(PredictError::validation)
}

/// Explicit format, else `.json` means JSON and anything else PDF.
pub fn report_format(path: &Path, explicit: Option<ReportFormatArg>) -> ReportFormat {
    if let Some(format) = explicit {
        return format.into();
    }
    match path.extension().and_then(|extension| extension.to_str()) {
        Some(extension) if extension.eq_ignore_ascii_case("json") => ReportFormat::Json,
        _ => ReportFormat::Pdf,
    }
}
