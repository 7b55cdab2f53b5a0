//! Patient report export.
//!
//! The report is first laid out as styled lines, then either drawn onto A4
//! pages with the PDF base-14 fonts or serialised as JSON.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use gt_explain::Attribution;
use gt_model::{Feature, Outcome, Prediction, RiskTier};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use serde::Serialize;
use tracing::{info, info_span};

use crate::error::{ReportError, Result};
use crate::recommendation::report_recommendation;

pub const DEFAULT_ORGANIZATION: &str = "Bangladesh Medical Society of Victoria";
pub const DEFAULT_FOOTER: &str =
    "© Bangladesh Medical Society of Victoria | https://bmsvictoria.org.au";
pub const REPORT_TITLE: &str = "Diabetes Risk Report";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NOTES_RULE: &str =
    "......................................................................................................";
const DETAILS_PER_ROW: usize = 3;
const WRAP_CHARS: usize = 95;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const COLUMN_WIDTH: f32 = 178.0;
const BRAND_BLUE: [f32; 3] = [0.0, 85.0 / 255.0, 140.0 / 255.0];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub organization: String,
    pub footer: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Pdf,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Json => "json",
        }
    }
}

/// Optional patient identification; blank entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatientIdentity {
    pub name: Option<String>,
    pub id: Option<String>,
}

impl PatientIdentity {
    pub fn new(name: Option<&str>, id: Option<&str>) -> Self {
        let clean = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Self {
            name: clean(name),
            id: clean(id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.id.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttributionRow {
    pub feature: Feature,
    pub value: f64,
    pub contribution: f64,
}

/// Everything printed in the patient report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientReport {
    pub organization: String,
    pub title: String,
    pub generated_at: String,
    pub patient: PatientIdentity,
    pub details: Vec<(Feature, f64)>,
    pub outcome: Outcome,
    pub outcome_label: String,
    pub probability: f64,
    pub confidence: String,
    pub tier: RiskTier,
    pub recommendation: String,
    /// Contributions by descending magnitude, in log-odds.
    pub attribution: Option<Vec<AttributionRow>>,
    pub base_value: Option<f64>,
    pub dataset_fingerprint: Option<String>,
    pub footer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Banner,
    Title,
    Timestamp,
    Heading,
    Body,
    Small,
    Footer,
}

/// One laid-out line; several cells are drawn in fixed-width columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub style: LineStyle,
    pub cells: Vec<String>,
}

impl ReportLine {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            cells: vec![text.into()],
        }
    }

    fn blank() -> Self {
        Self {
            style: LineStyle::Body,
            cells: Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.cells.join("    ")
    }
}

impl PatientReport {
    pub fn new(
        prediction: &Prediction,
        patient: PatientIdentity,
        attribution: Option<&Attribution>,
        dataset_fingerprint: Option<&str>,
        options: &ReportOptions,
        generated_at: NaiveDateTime,
    ) -> Self {
        let outcome = prediction.predicted_class();
        Self {
            organization: options.organization.clone(),
            title: REPORT_TITLE.to_string(),
            generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
            patient,
            details: prediction.input().iter().collect(),
            outcome,
            outcome_label: outcome.label().to_string(),
            probability: prediction.probability(),
            confidence: format!("{:.2}%", prediction.result().percent()),
            tier: prediction.tier(),
            recommendation: report_recommendation(outcome).to_string(),
            attribution: attribution.map(|attribution| {
                attribution
                    .ranked()
                    .into_iter()
                    .map(|(feature, contribution)| AttributionRow {
                        feature,
                        value: prediction.input().get(feature).unwrap_or(f64::NAN),
                        contribution,
                    })
                    .collect()
            }),
            base_value: attribution.map(|attribution| attribution.base_value),
            dataset_fingerprint: dataset_fingerprint.map(str::to_string),
            footer: options.footer.clone(),
        }
    }

    /// The report as styled lines, top to bottom.
    pub fn lines(&self) -> Vec<ReportLine> {
        let mut lines = vec![
            ReportLine::new(LineStyle::Banner, &self.organization),
            ReportLine::new(LineStyle::Title, &self.title),
            ReportLine::new(
                LineStyle::Timestamp,
                format!("Report Generated: {}", self.generated_at),
            ),
        ];

        if !self.patient.is_empty() {
            lines.push(ReportLine::new(LineStyle::Heading, "Patient Identification:"));
            if let Some(name) = &self.patient.name {
                lines.push(ReportLine::new(LineStyle::Body, format!("Name: {name}")));
            }
            if let Some(id) = &self.patient.id {
                lines.push(ReportLine::new(LineStyle::Body, format!("ID: {id}")));
            }
        }

        lines.push(ReportLine::new(LineStyle::Heading, "Patient Details:"));
        for row in self.details.chunks(DETAILS_PER_ROW) {
            lines.push(ReportLine {
                style: LineStyle::Body,
                cells: row
                    .iter()
                    .map(|(feature, value)| format!("{feature}: {value}"))
                    .collect(),
            });
        }

        lines.push(ReportLine::new(LineStyle::Heading, "Prediction:"));
        lines.push(ReportLine::new(
            LineStyle::Body,
            format!("Outcome: {}", self.outcome_label),
        ));
        lines.push(ReportLine::new(
            LineStyle::Body,
            format!("Confidence: {}", self.confidence),
        ));
        lines.push(ReportLine::new(
            LineStyle::Body,
            format!("Risk Tier: {}", self.tier.label()),
        ));

        lines.push(ReportLine::new(LineStyle::Heading, "Recommendation:"));
        for chunk in wrap(&self.recommendation, WRAP_CHARS) {
            lines.push(ReportLine::new(LineStyle::Body, chunk));
        }

        lines.push(ReportLine::new(LineStyle::Heading, "Doctor's Notes:"));
        lines.push(ReportLine::new(LineStyle::Body, NOTES_RULE));
        lines.push(ReportLine::blank());
        lines.push(ReportLine::new(LineStyle::Body, NOTES_RULE));

        if let Some(rows) = &self.attribution {
            lines.push(ReportLine::new(
                LineStyle::Heading,
                "Feature Attribution (log-odds):",
            ));
            if let Some(base) = self.base_value {
                lines.push(ReportLine::new(
                    LineStyle::Small,
                    format!("Base value: {base:.3}"),
                ));
            }
            for row in rows {
                lines.push(ReportLine {
                    style: LineStyle::Body,
                    cells: vec![
                        row.feature.to_string(),
                        row.value.to_string(),
                        format!("{:+.3}", row.contribution),
                    ],
                });
            }
        }

        if let Some(fingerprint) = &self.dataset_fingerprint {
            lines.push(ReportLine::new(
                LineStyle::Small,
                format!("Dataset SHA-256: {fingerprint}"),
            ));
        }
        lines.push(ReportLine::new(LineStyle::Footer, &self.footer));
        lines
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(font("Helvetica"));
        let bold = doc.add_object(font("Helvetica-Bold"));
        let italic = doc.add_object(font("Helvetica-Oblique"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
                "F3" => italic,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in paginate(&self.lines()) {
            let content = Content { operations };
            let encoded = content
                .encode()
                .map_err(|err| ReportError::Pdf(err.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|err| ReportError::Pdf(err.to_string()))?;
        Ok(bytes)
    }

    pub fn render(&self, format: ReportFormat) -> Result<Vec<u8>> {
        match format {
            ReportFormat::Pdf => self.to_pdf(),
            ReportFormat::Json => self.to_json().map(String::into_bytes),
        }
    }

    /// Render and write the report to `path`.
    pub fn write(&self, path: &Path, format: ReportFormat) -> Result<()> {
        let span = info_span!("export", format = format.extension());
        let _guard = span.enter();

        let bytes = self.render(format)?;
        fs::write(path, &bytes).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "report written");
        Ok(())
    }
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Greedy word wrap at `width` characters.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Font resource, size and leading for a style.
fn metrics(style: LineStyle) -> (&'static str, f32, f32) {
    match style {
        LineStyle::Banner => ("F2", 16.0, 30.0),
        LineStyle::Title => ("F1", 12.0, 24.0),
        LineStyle::Timestamp => ("F1", 10.0, 20.0),
        LineStyle::Heading => ("F2", 10.0, 22.0),
        LineStyle::Body => ("F1", 11.0, 16.0),
        LineStyle::Small => ("F1", 9.0, 14.0),
        LineStyle::Footer => ("F3", 8.0, 24.0),
    }
}

/// Rough Helvetica width; good enough to centre and right-align short lines.
fn approx_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// PDF literal string in WinAnsi (Latin-1) bytes.
fn pdf_text(text: &str) -> Object {
    let bytes = text
        .chars()
        .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
        .collect::<Vec<u8>>();
    Object::String(bytes, StringFormat::Literal)
}

fn fill_color(rgb: [f32; 3]) -> Operation {
    Operation::new("rg", rgb.iter().map(|value| (*value).into()).collect())
}

fn show_text(font: &str, size: f32, x: f32, y: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![pdf_text(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Lay lines out top-down, starting a new page when the bottom margin is hit.
fn paginate(lines: &[ReportLine]) -> Vec<Vec<Operation>> {
    let mut pages = Vec::new();
    let mut operations = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let (font, size, leading) = metrics(line.style);
        if y - leading < MARGIN && !operations.is_empty() {
            pages.push(std::mem::take(&mut operations));
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= leading;
        let baseline = y + (leading - size) / 2.0;

        match line.style {
            LineStyle::Banner => {
                let text = line.text();
                operations.push(fill_color(BRAND_BLUE));
                operations.push(Operation::new(
                    "re",
                    vec![
                        MARGIN.into(),
                        y.into(),
                        (PAGE_WIDTH - 2.0 * MARGIN).into(),
                        leading.into(),
                    ],
                ));
                operations.push(Operation::new("f", vec![]));
                operations.push(fill_color([1.0, 1.0, 1.0]));
                let x = (PAGE_WIDTH - approx_width(&text, size)) / 2.0;
                operations.extend(show_text(font, size, x, baseline, &text));
                operations.push(fill_color([0.0, 0.0, 0.0]));
            }
            LineStyle::Title => {
                let text = line.text();
                let x = (PAGE_WIDTH - approx_width(&text, size)) / 2.0;
                operations.extend(show_text(font, size, x, baseline, &text));
            }
            LineStyle::Timestamp => {
                let text = line.text();
                let x = PAGE_WIDTH - MARGIN - approx_width(&text, size);
                operations.extend(show_text(font, size, x, baseline, &text));
            }
            LineStyle::Footer => {
                let text = line.text();
                let x = ((PAGE_WIDTH - approx_width(&text, size)) / 2.0).max(MARGIN);
                operations.push(fill_color(BRAND_BLUE));
                operations.extend(show_text(font, size, x, baseline, &text));
                operations.push(fill_color([0.0, 0.0, 0.0]));
            }
            LineStyle::Heading | LineStyle::Body | LineStyle::Small => {
                for (column, cell) in line.cells.iter().enumerate() {
                    let x = MARGIN + column as f32 * COLUMN_WIDTH;
                    operations.extend(show_text(font, size, x, baseline, cell));
                }
            }
        }
    }
    if !operations.is_empty() || pages.is_empty() {
        pages.push(operations);
    }
    pages
}
