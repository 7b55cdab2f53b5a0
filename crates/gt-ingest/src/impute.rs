//! Column-median imputation.

use std::collections::BTreeMap;

use gt_model::{Feature, PatientRecord};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::reader::RawRecord;

/// Median of `values`; the mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Outcome of filling missing cells.
#[derive(Debug, Clone)]
pub struct Imputed {
    pub records: Vec<PatientRecord>,
    pub medians: BTreeMap<Feature, f64>,
    pub filled: BTreeMap<Feature, usize>,
}

/// Fill every missing cell with its column median over the whole dataset.
///
/// Medians are taken over observed values only, i.e. after zero
/// substitution and before any other transformation.
pub fn impute_medians(raw: &[RawRecord]) -> Result<Imputed> {
    let mut medians = BTreeMap::new();
    let mut filled = BTreeMap::new();
    for feature in Feature::ALL {
        let observed: Vec<f64> = raw
            .iter()
            .filter_map(|record| record.values[feature.index()])
            .collect();
        let missing = raw.len() - observed.len();
        match median(&observed) {
            Some(value) => {
                medians.insert(feature, value);
            }
            None if missing > 0 => return Err(IngestError::NoObservedValues { feature }),
            None => {}
        }
        if missing > 0 {
            debug!(
                feature = %feature,
                missing,
                median = medians.get(&feature).copied().unwrap_or_default(),
                "imputing missing values"
            );
            filled.insert(feature, missing);
        }
    }

    let records = raw
        .iter()
        .map(|record| {
            let mut values = [0.0; 8];
            for feature in Feature::ALL {
                let idx = feature.index();
                values[idx] = record.values[idx]
                    .or_else(|| medians.get(&feature).copied())
                    .unwrap_or_default();
            }
            PatientRecord::new(values, record.outcome)
        })
        .collect();

    Ok(Imputed {
        records,
        medians,
        filled,
    })
}

#[cfg(test)]
mod tests {
    use gt_model::Outcome;

    use super::*;

    fn raw(glucose: Option<f64>, insulin: Option<f64>) -> RawRecord {
        let mut values = [Some(1.0); 8];
        values[Feature::Glucose.index()] = glucose;
        values[Feature::Insulin.index()] = insulin;
        RawRecord {
            values,
            outcome: Outcome::NoDiabetes,
        }
    }

    #[test]
    fn median_handles_odd_and_even_counts() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn missing_cells_take_column_median() {
        let imputed = impute_medians(&[
            raw(Some(100.0), None),
            raw(None, Some(80.0)),
            raw(Some(140.0), Some(120.0)),
        ])
        .unwrap();
        assert_eq!(imputed.medians[&Feature::Glucose], 120.0);
        assert_eq!(imputed.medians[&Feature::Insulin], 100.0);
        assert_eq!(imputed.records[1].value(Feature::Glucose), 120.0);
        assert_eq!(imputed.records[0].value(Feature::Insulin), 100.0);
        assert_eq!(imputed.filled[&Feature::Glucose], 1);
        assert!(!imputed.filled.contains_key(&Feature::Age));
    }

    #[test]
    fn column_without_observations_is_an_error() {
        let err = impute_medians(&[raw(None, Some(1.0)), raw(None, Some(2.0))]).unwrap_err();
        assert!(matches!(
            err,
            IngestError::NoObservedValues {
                feature: Feature::Glucose
            }
        ));
    }
}
