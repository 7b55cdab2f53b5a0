//! CLI argument definitions for GlucoTrack.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use gt_model::Feature;
use gt_report::ReportFormat;

#[derive(Debug, Parser)]
#[command(
    name = "glucotrack",
    version,
    about = "GlucoTrack - Diabetes risk prediction and reporting",
    long_about = "Predict diabetes risk from clinical measurements.\n\n\
                  Fits a logistic regression model on the Pima Indians diabetes dataset,\n\
                  explains each prediction and exports patient reports as PDF or JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the emitting module in log lines.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,

    /// Omit span close events from JSON logs.
    #[arg(long = "no-log-spans", global = true)]
    pub no_log_spans: bool,

    /// Include patient values in log output.
    ///
    /// Values are replaced by a redaction marker unless this flag is set.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// TOML configuration file.
    #[arg(long = "config", value_name = "TOML", global = true)]
    pub config: Option<PathBuf>,

    /// Dataset CSV (overrides `dataset.path` from the configuration).
    #[arg(long = "dataset", value_name = "CSV", global = true)]
    pub dataset: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarise the dataset: KPIs, rates by group, rate grids and statistics.
    Overview,

    /// Predict the diabetes risk of one patient.
    Predict(InputArgs),

    /// Compare a patient with the dataset and test the impact of changes.
    Analytics(AnalyticsArgs),

    /// Show global feature importance and explain one prediction.
    Explain(ExplainArgs),

    /// Show lifestyle recommendations for the predicted risk tier.
    Recommend(InputArgs),

    /// Write a patient report.
    Export(ExportArgs),

    /// Start an interactive session reading commands from stdin.
    Session,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Patient measurement, e.g. `--set Glucose=150`. Repeat for each feature.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyticsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Re-predict with a changed value, e.g. `--adjust Glucose=110`.
    ///
    /// Adjusted values are limited to the range observed in the dataset.
    #[arg(long = "adjust", value_name = "NAME=VALUE", value_parser = parse_adjustment)]
    pub adjust: Vec<(Feature, f64)>,
}

#[derive(Args, Debug, Clone)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Explain a dataset record (zero-based) instead of a submitted patient.
    #[arg(long = "record", value_name = "N", conflicts_with = "set")]
    pub record: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Report file to write.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: PathBuf,

    /// Patient name printed on the report.
    #[arg(long = "name")]
    pub name: Option<String>,

    /// Patient identifier printed on the report.
    #[arg(long = "patient-id", value_name = "ID")]
    pub patient_id: Option<String>,

    /// Report format (default: from the output extension, else pdf).
    #[arg(long = "format", value_enum)]
    pub format: Option<ReportFormatArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormatArg {
    Pdf,
    Json,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(value: ReportFormatArg) -> Self {
        match value {
            ReportFormatArg::Pdf => ReportFormat::Pdf,
            ReportFormatArg::Json => ReportFormat::Json,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Split `NAME=VALUE`; the value may be empty.
pub fn parse_assignment(text: &str) -> Result<(String, String), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{text}`"))?;
    if name.trim().is_empty() {
        return Err(format!("missing feature name in `{text}`"));
    }
    Ok((name.trim().to_string(), value.to_string()))
}

/// Parse `NAME=VALUE` into a known feature and a number.
pub fn parse_adjustment(text: &str) -> Result<(Feature, f64), String> {
    let (name, value) = parse_assignment(text)?;
    let feature: Feature = name.parse().map_err(|error| format!("{error}"))?;
    let value = gt_predict::parse_value(&value)
        .ok_or_else(|| format!("'{}' is not a number", value.trim()))?;
    Ok((feature, value))
}
