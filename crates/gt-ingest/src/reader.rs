//! Raw CSV parsing into per-column optional values.

use csv::ReaderBuilder;

use gt_model::{Feature, Outcome};

use crate::error::{IngestError, Result};

/// Column holding the binary label.
pub const OUTCOME_COLUMN: &str = "Outcome";

/// A parsed row before imputation; `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub values: [Option<f64>; 8],
    pub outcome: Outcome,
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn normalize_cell(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

struct ColumnIndex {
    features: [usize; 8],
    outcome: usize,
}

fn index_columns(headers: &[String], source_name: &str) -> Result<ColumnIndex> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| IngestError::MissingColumn {
                source_name: source_name.to_string(),
                column: name.to_string(),
            })
    };
    let mut features = [0usize; 8];
    for feature in Feature::ALL {
        features[feature.index()] = find(feature.name())?;
    }
    Ok(ColumnIndex {
        features,
        outcome: find(OUTCOME_COLUMN)?,
    })
}

fn parse_outcome(value: &str, row: usize, source_name: &str) -> Result<Outcome> {
    let invalid = || IngestError::InvalidOutcome {
        source_name: source_name.to_string(),
        row,
        value: value.to_string(),
    };
    let number: f64 = value.parse().map_err(|_| invalid())?;
    if number == 0.0 {
        Ok(Outcome::NoDiabetes)
    } else if number == 1.0 {
        Ok(Outcome::Diabetes)
    } else {
        Err(invalid())
    }
}

/// Parse CSV bytes into raw records.
///
/// Rows made only of empty cells are skipped. `zero_as_missing` lists the
/// features where a literal 0 means "not measured".
pub fn read_raw_records(
    bytes: &[u8],
    source_name: &str,
    zero_as_missing: &[Feature],
) -> Result<Vec<RawRecord>> {
    let csv_error = |source| IngestError::Csv {
        source_name: source_name.to_string(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(normalize_header)
        .collect();
    let columns = index_columns(&headers, source_name)?;

    let mut records = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        // Header is line 1.
        let row = idx + 2;
        let mut values = [None; 8];
        for feature in Feature::ALL {
            let cell = normalize_cell(record.get(columns.features[feature.index()]).unwrap_or(""));
            if cell.is_empty() {
                continue;
            }
            let value: f64 = cell
                .parse()
                .ok()
                .filter(|value: &f64| value.is_finite())
                .ok_or_else(|| IngestError::InvalidNumber {
                    source_name: source_name.to_string(),
                    row,
                    column: feature.name().to_string(),
                    value: cell.to_string(),
                })?;
            if value == 0.0 && zero_as_missing.contains(&feature) {
                continue;
            }
            values[feature.index()] = Some(value);
        }
        let outcome_cell = normalize_cell(record.get(columns.outcome).unwrap_or(""));
        let outcome = parse_outcome(outcome_cell, row, source_name)?;
        records.push(RawRecord { values, outcome });
    }
    Ok(records)
}
