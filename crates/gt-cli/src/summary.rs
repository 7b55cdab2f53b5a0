//! Terminal rendering of views as `comfy-table` tables.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use gt_explain::Attribution;
use gt_model::{Feature, IssueKind, Prediction, RiskTier, ValidationError};
use gt_report::{
    ANALYTICS_DISCLAIMER, FeatureComparison, GroupRate, ImpactTest, Overview,
    RECOMMENDATION_DISCLAIMER, RateGrid, Recommendation, class_advice, risk_bar,
};

const BAR_WIDTH: usize = 30;

pub fn render_overview(overview: &Overview) -> String {
    let mut kpis = Table::new();
    kpis.set_header(vec![
        header_cell("Records"),
        header_cell("Diabetic"),
        header_cell("Diabetes rate"),
        header_cell("Mean glucose"),
        header_cell("Mean BMI"),
    ]);
    apply_summary_table_style(&mut kpis);
    kpis.add_row(vec![
        Cell::new(overview.total),
        Cell::new(overview.positives),
        rate_cell(overview.positive_rate),
        optional_cell(overview.mean_glucose, 1),
        optional_cell(overview.mean_bmi, 1),
    ]);
    for index in 0..5 {
        align_column(&mut kpis, index, CellAlignment::Right);
    }

    let mut outcomes = Table::new();
    outcomes.set_header(vec![
        header_cell("Outcome"),
        header_cell("Count"),
        header_cell("Share"),
    ]);
    apply_table_style(&mut outcomes);
    for (outcome, count) in &overview.outcome_counts {
        let share = (overview.total > 0).then(|| *count as f64 / overview.total as f64);
        outcomes.add_row(vec![Cell::new(outcome.label()), Cell::new(count), rate_cell(share)]);
    }
    align_column(&mut outcomes, 1, CellAlignment::Right);
    align_column(&mut outcomes, 2, CellAlignment::Right);

    let mut summary = Table::new();
    summary.set_header(vec![
        header_cell("Feature"),
        header_cell("count"),
        header_cell("mean"),
        header_cell("std"),
        header_cell("min"),
        header_cell("25%"),
        header_cell("50%"),
        header_cell("75%"),
        header_cell("max"),
    ]);
    apply_table_style(&mut summary);
    for (feature, describe) in &overview.summary {
        summary.add_row(vec![
            Cell::new(feature.name()),
            Cell::new(describe.count),
            Cell::new(format!("{:.2}", describe.mean)),
            optional_cell(describe.std, 2),
            Cell::new(format!("{:.2}", describe.min)),
            Cell::new(format!("{:.2}", describe.q25)),
            Cell::new(format!("{:.2}", describe.median)),
            Cell::new(format!("{:.2}", describe.q75)),
            Cell::new(format!("{:.2}", describe.max)),
        ]);
    }
    for index in 1..9 {
        align_column(&mut summary, index, CellAlignment::Right);
    }

    [
        format!("Dataset overview\n{kpis}"),
        format!("Outcome distribution\n{outcomes}"),
        format!(
            "Diabetes rate by age group (95% CI)\n{}",
            group_table("Age group", &overview.by_age_group, true)
        ),
        format!(
            "Diabetes rate by pregnancies\n{}",
            group_table("Pregnancies", &overview.by_pregnancies, false)
        ),
        format!(
            "Diabetes rate by BMI category\n{}",
            group_table("BMI category", &overview.by_bmi_category, false)
        ),
        format!(
            "Diabetes rate by Age x BMI\n{}",
            grid_table(&overview.age_bmi)
        ),
        format!(
            "Diabetes rate by Age x Glucose\n{}",
            grid_table(&overview.age_glucose)
        ),
        format!("Summary statistics\n{summary}"),
    ]
    .join("\n\n")
}

fn group_table(label: &str, groups: &[GroupRate], with_interval: bool) -> Table {
    let mut table = Table::new();
    let mut header = vec![
        header_cell(label),
        header_cell("Records"),
        header_cell("Diabetic"),
        header_cell("Rate"),
    ];
    if with_interval {
        header.push(header_cell("95% CI"));
    }
    table.set_header(header);
    apply_table_style(&mut table);
    for group in groups {
        let mut row = vec![
            Cell::new(&group.label),
            Cell::new(group.count),
            Cell::new(group.positives),
            rate_cell(group.rate),
        ];
        if with_interval {
            row.push(match group.interval {
                Some((low, high)) => Cell::new(format!("{:.1}% - {:.1}%", low * 100.0, high * 100.0)),
                None => dim_cell("-"),
            });
        }
        table.add_row(row);
    }
    for index in 1..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table
}

fn grid_table(grid: &RateGrid) -> Table {
    let mut table = Table::new();
    let corner = format!("{} \\ {}", grid.row_feature, grid.column_feature);
    let mut header = vec![header_cell(&corner)];
    header.extend(grid.columns.iter().map(|column| header_cell(column)));
    table.set_header(header);
    apply_table_style(&mut table);
    for (row_index, row) in grid.rows.iter().enumerate() {
        let mut cells = vec![Cell::new(row)];
        cells.extend((0..grid.columns.len()).map(|column| rate_cell(grid.cell(row_index, column))));
        table.add_row(cells);
    }
    for index in 1..=grid.columns.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table
}

pub fn render_prediction(prediction: &Prediction) -> String {
    let mut inputs = Table::new();
    inputs.set_header(vec![header_cell("Feature"), header_cell("Value")]);
    apply_table_style(&mut inputs);
    for (feature, value) in prediction.input().iter() {
        inputs.add_row(vec![Cell::new(feature.name()), Cell::new(value)]);
    }
    align_column(&mut inputs, 1, CellAlignment::Right);

    let result = prediction.result();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Prediction"),
        header_cell("Probability"),
        header_cell("Risk tier"),
    ]);
    apply_summary_table_style(&mut table);
    table.add_row(vec![
        Cell::new(result.predicted_class().label()).add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1}%", result.percent())),
        tier_cell(result.tier()),
    ]);
    align_column(&mut table, 1, CellAlignment::Right);

    format!(
        "Patient input\n{inputs}\n\n{table}\n{} {:.1}%\n{}\n{}",
        risk_bar(result.probability(), BAR_WIDTH),
        result.percent(),
        result.tier().band(),
        class_advice(result.predicted_class()),
    )
}

/// Table of rejected fields, one row per issue.
pub fn render_validation(error: &ValidationError) -> String {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Problem")]);
    apply_table_style(&mut table);
    for issue in &error.issues {
        let problem = match &issue.kind {
            IssueKind::Missing => "missing value".to_string(),
            IssueKind::Unparseable { raw } => format!("'{raw}' is not a number"),
            IssueKind::OutOfBounds { value, bounds } => {
                format!("{value} is outside {} - {}", bounds.min, bounds.max)
            }
            IssueKind::Duplicate => "supplied more than once".to_string(),
        };
        table.add_row(vec![
            Cell::new(issue.feature.name()).fg(Color::Red),
            Cell::new(problem),
        ]);
    }
    format!("{error}\n{table}")
}

pub fn render_recommendation(recommendation: &Recommendation) -> String {
    let mut lines = vec![
        format!("{}: {}", recommendation.tier.label(), recommendation.headline),
        String::new(),
    ];
    lines.extend(
        recommendation
            .actions
            .iter()
            .map(|action| format!("  - {action}")),
    );
    lines.push(String::new());
    lines.push(RECOMMENDATION_DISCLAIMER.to_string());
    lines.join("\n")
}

pub fn render_comparison(comparison: &[FeatureComparison]) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Feature"),
        header_cell("You"),
        header_cell("Non-diabetic avg"),
        header_cell("Diabetic avg"),
    ]);
    apply_table_style(&mut table);
    for row in comparison {
        table.add_row(vec![
            Cell::new(row.feature.name()),
            Cell::new(row.input).add_attribute(Attribute::Bold),
            optional_cell(row.non_diabetic_mean, 1),
            optional_cell(row.diabetic_mean, 1),
        ]);
    }
    for index in 1..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    format!("You vs dataset averages\n{table}")
}

/// Min-max scaled profile drawn as bars.
pub fn render_radar(profile: &[(Feature, f64)]) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Feature"),
        header_cell("Scaled"),
        header_cell(""),
    ]);
    apply_table_style(&mut table);
    for (feature, scaled) in profile {
        table.add_row(vec![
            Cell::new(feature.name()),
            Cell::new(format!("{scaled:.2}")),
            Cell::new(risk_bar(*scaled, 20)),
        ]);
    }
    align_column(&mut table, 1, CellAlignment::Right);
    format!("Health profile (0 = dataset minimum, 1 = maximum)\n{table}")
}

/// Risk score block shown on the analytics screen.
pub fn render_risk_score(prediction: &Prediction) -> String {
    let result = prediction.result();
    format!(
        "Diabetes risk score: {:.1}%\n{}\n{}: {}\n{ANALYTICS_DISCLAIMER}",
        result.percent(),
        risk_bar(result.probability(), BAR_WIDTH),
        result.tier().label(),
        result.tier().band(),
    )
}

/// Waterfall from the base value to the model output, largest effects first.
pub fn render_attribution(attribution: &Attribution) -> String {
    let mut rows: Vec<(Feature, f64, f64)> = attribution
        .contributions
        .iter()
        .zip(&attribution.values)
        .map(|((feature, contribution), value)| (*feature, *value, *contribution))
        .collect();
    rows.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Feature"),
        header_cell("Value"),
        header_cell("Contribution"),
        header_cell("Cumulative"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        dim_cell("E[f(x)]"),
        dim_cell(""),
        dim_cell(""),
        Cell::new(format!("{:.3}", attribution.base_value)),
    ]);
    let mut cumulative = attribution.base_value;
    for (feature, value, contribution) in rows {
        cumulative += contribution;
        let color = if contribution >= 0.0 {
            Color::Red
        } else {
            Color::Blue
        };
        table.add_row(vec![
            Cell::new(feature.name()),
            Cell::new(value),
            Cell::new(format!("{contribution:+.3}")).fg(color),
            Cell::new(format!("{cumulative:.3}")),
        ]);
    }
    table.add_row(vec![
        Cell::new("f(x)").add_attribute(Attribute::Bold),
        dim_cell(""),
        dim_cell(""),
        Cell::new(format!("{:.3}", attribution.output_value)).add_attribute(Attribute::Bold),
    ]);
    for index in 1..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    format!(
        "Feature attribution (log-odds)\n{table}\nBase probability {:.1}% -> predicted {:.1}%",
        attribution.base_probability() * 100.0,
        attribution.output_probability() * 100.0,
    )
}

pub fn render_importance(importance: &[(Feature, f64)]) -> String {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Feature"), header_cell("Mean |contribution|")]);
    apply_table_style(&mut table);
    for (feature, value) in importance {
        table.add_row(vec![Cell::new(feature.name()), Cell::new(format!("{value:.4}"))]);
    }
    align_column(&mut table, 1, CellAlignment::Right);
    format!("Global feature importance\n{table}")
}

pub fn render_impact(test: &ImpactTest) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(""),
        header_cell("Probability"),
        header_cell("Risk tier"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new("Current"),
        Cell::new(format!("{:.1}%", test.baseline_probability * 100.0)),
        tier_cell(RiskTier::from_probability(test.baseline_probability)),
    ]);
    table.add_row(vec![
        Cell::new("Adjusted"),
        Cell::new(format!("{:.1}%", test.probability() * 100.0)),
        tier_cell(test.tier()),
    ]);
    align_column(&mut table, 1, CellAlignment::Right);
    let mut text = format!(
        "Feature impact\n{table}\nChange: {:+.1} percentage points",
        test.delta() * 100.0
    );
    if !test.clamped.is_empty() {
        let names: Vec<&str> = test.clamped.iter().map(|feature| feature.name()).collect();
        text.push_str(&format!(
            "\nLimited to the accepted range: {}",
            names.join(", ")
        ));
    }
    text
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn rate_cell(rate: Option<f64>) -> Cell {
    match rate {
        Some(rate) => Cell::new(format!("{:.1}%", rate * 100.0)),
        None => dim_cell("-"),
    }
}

fn optional_cell(value: Option<f64>, decimals: usize) -> Cell {
    match value {
        Some(value) => Cell::new(format!("{value:.decimals$}")),
        None => dim_cell("-"),
    }
}

fn tier_cell(tier: RiskTier) -> Cell {
    let color = match tier {
        RiskTier::High => Color::Red,
        RiskTier::Moderate => Color::Yellow,
        RiskTier::Low => Color::Green,
    };
    Cell::new(tier.label())
        .fg(color)
        .add_attribute(Attribute::Bold)
}
