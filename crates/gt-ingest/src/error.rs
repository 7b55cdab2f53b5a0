#![deny(unsafe_code)]

use std::path::PathBuf;

use gt_model::Feature;

/// The dataset could not be produced. Always fatal to the caller.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("missing required column in {source_name}: {column}")]
    MissingColumn { source_name: String, column: String },

    #[error("invalid number in {source_name}, row {row}, column {column}: '{value}'")]
    InvalidNumber {
        source_name: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("invalid outcome in {source_name}, row {row}: '{value}' (expected 0 or 1)")]
    InvalidOutcome {
        source_name: String,
        row: usize,
        value: String,
    },

    #[error("dataset {source_name} has no records")]
    Empty { source_name: String },

    #[error("column {feature} has no observed values to impute from")]
    NoObservedValues { feature: Feature },
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
