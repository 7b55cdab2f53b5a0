//! Population overview of the loaded dataset.

use gt_model::{AgeGroup, BmiCategory, Dataset, Feature, Outcome, PatientRecord};
use serde::Serialize;

use crate::stats::{Describe, Z_95, wilson_interval};

/// Age edges of the rate grids; intervals are right-closed.
pub const GRID_AGE_EDGES: [f64; 6] = [20.0, 30.0, 40.0, 50.0, 60.0, 70.0];
pub const GRID_BMI_EDGES: [f64; 7] = [15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0];
pub const GRID_GLUCOSE_EDGES: [f64; 8] = [50.0, 70.0, 90.0, 110.0, 130.0, 150.0, 170.0, 190.0];

/// Diabetes rate within one group of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    pub label: String,
    pub count: usize,
    pub positives: usize,
    /// `None` for an empty group.
    pub rate: Option<f64>,
    /// Wilson 95% interval of the rate.
    pub interval: Option<(f64, f64)>,
}

impl GroupRate {
    fn new(label: impl Into<String>, count: usize, positives: usize) -> Self {
        Self {
            label: label.into(),
            count,
            positives,
            rate: (count > 0).then(|| positives as f64 / count as f64),
            interval: wilson_interval(positives, count, Z_95),
        }
    }

    fn of<'a>(label: impl Into<String>, records: impl Iterator<Item = &'a PatientRecord>) -> Self {
        let (count, positives) = records.fold((0, 0), |(count, positives), record| {
            (count + 1, positives + usize::from(record.outcome == Outcome::Diabetes))
        });
        Self::new(label, count, positives)
    }
}

/// Mean outcome over a two-way binning; empty cells are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateGrid {
    pub row_feature: Feature,
    pub column_feature: Feature,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl RateGrid {
    pub fn build(
        dataset: &Dataset,
        row_feature: Feature,
        row_edges: &[f64],
        column_feature: Feature,
        column_edges: &[f64],
    ) -> Self {
        let rows = interval_labels(row_edges);
        let columns = interval_labels(column_edges);
        let mut tally = vec![vec![(0usize, 0usize); columns.len()]; rows.len()];
        for record in dataset.records() {
            let row = bin_index(record.value(row_feature), row_edges);
            let column = bin_index(record.value(column_feature), column_edges);
            if let (Some(row), Some(column)) = (row, column) {
                let cell = &mut tally[row][column];
                cell.0 += 1;
                cell.1 += usize::from(record.outcome == Outcome::Diabetes);
            }
        }
        let cells = tally
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(count, positives)| {
                        (count > 0).then(|| positives as f64 / count as f64)
                    })
                    .collect()
            })
            .collect();
        Self {
            row_feature,
            column_feature,
            rows,
            columns,
            cells,
        }
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get(row)?.get(column).copied().flatten()
    }
}

/// Index of the right-closed interval `(edges[i], edges[i + 1]]` holding
/// `value`.
pub fn bin_index(value: f64, edges: &[f64]) -> Option<usize> {
    edges
        .windows(2)
        .position(|pair| pair[0] < value && value <= pair[1])
}

fn interval_labels(edges: &[f64]) -> Vec<String> {
    edges
        .windows(2)
        .map(|pair| format!("({}, {}]", pair[0], pair[1]))
        .collect()
}

/// Everything the overview screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total: usize,
    pub positives: usize,
    pub positive_rate: Option<f64>,
    pub mean_glucose: Option<f64>,
    pub mean_bmi: Option<f64>,
    pub outcome_counts: Vec<(Outcome, usize)>,
    pub by_age_group: Vec<GroupRate>,
    pub by_pregnancies: Vec<GroupRate>,
    pub by_bmi_category: Vec<GroupRate>,
    pub age_bmi: RateGrid,
    pub age_glucose: RateGrid,
    pub summary: Vec<(Feature, Describe)>,
}

impl Overview {
    pub fn build(dataset: &Dataset) -> Self {
        let records = dataset.records();
        let by_age_group = AgeGroup::ALL
            .iter()
            .map(|group| {
                GroupRate::of(
                    group.label(),
                    records
                        .iter()
                        .filter(|record| record.age_group == Some(*group)),
                )
            })
            .collect();
        let by_bmi_category = BmiCategory::ALL
            .iter()
            .map(|category| {
                GroupRate::of(
                    category.label(),
                    records
                        .iter()
                        .filter(|record| record.bmi_category == Some(*category)),
                )
            })
            .collect();
        let summary = Feature::ALL
            .iter()
            .filter_map(|feature| Describe::of(&dataset.column(*feature)).map(|d| (*feature, d)))
            .collect();

        Self {
            total: dataset.len(),
            positives: dataset.count(Outcome::Diabetes),
            positive_rate: dataset.positive_rate(),
            mean_glucose: dataset.mean(Feature::Glucose),
            mean_bmi: dataset.mean(Feature::Bmi),
            outcome_counts: vec![
                (Outcome::NoDiabetes, dataset.count(Outcome::NoDiabetes)),
                (Outcome::Diabetes, dataset.count(Outcome::Diabetes)),
            ],
            by_age_group,
            by_pregnancies: rate_by_value(records, Feature::Pregnancies),
            by_bmi_category,
            age_bmi: RateGrid::build(
                dataset,
                Feature::Age,
                &GRID_AGE_EDGES,
                Feature::Bmi,
                &GRID_BMI_EDGES,
            ),
            age_glucose: RateGrid::build(
                dataset,
                Feature::Age,
                &GRID_AGE_EDGES,
                Feature::Glucose,
                &GRID_GLUCOSE_EDGES,
            ),
            summary,
        }
    }
}

/// One group per distinct value of `feature`, ascending.
fn rate_by_value(records: &[PatientRecord], feature: Feature) -> Vec<GroupRate> {
    let mut values: Vec<f64> = records.iter().map(|record| record.value(feature)).collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
        .into_iter()
        .map(|value| {
            GroupRate::of(
                value.to_string(),
                records
                    .iter()
                    .filter(|record| record.value(feature) == value),
            )
        })
        .collect()
}
