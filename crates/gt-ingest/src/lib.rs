//! Dataset provider: loads the patient CSV, treats physiologically
//! impossible zeros as missing, fills gaps with column medians and derives
//! the categorical bins used by the overview views.

pub mod error;
pub mod impute;
pub mod reader;

use std::path::Path;

use gt_model::{Dataset, Feature, MODEL_FEATURES};
use sha2::Digest;
use tracing::{info, info_span};

pub use error::{IngestError, Result};
pub use impute::{Imputed, impute_medians, median};
pub use reader::{OUTCOME_COLUMN, RawRecord, read_raw_records};

/// Features where a recorded 0 cannot be a real measurement.
///
/// SkinThickness zeros are kept unless configured otherwise.
pub const DEFAULT_ZERO_AS_MISSING: [Feature; 5] = MODEL_FEATURES;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Features whose zero values are replaced by the column median.
    pub zero_as_missing: Vec<Feature>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            zero_as_missing: DEFAULT_ZERO_AS_MISSING.to_vec(),
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn with_zero_as_missing(mut self, features: Vec<Feature>) -> Self {
        self.zero_as_missing = features;
        self
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

/// Load and clean the dataset at `path`.
///
/// # Errors
///
/// Any failure is fatal: the application cannot run without a dataset.
pub fn load_dataset(path: &Path, options: &IngestOptions) -> Result<Dataset> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::io(path, source))?;
    load_dataset_from_bytes(&bytes, &path.display().to_string(), options)
}

/// Load and clean a dataset held in memory.
pub fn load_dataset_from_bytes(
    bytes: &[u8],
    source_name: &str,
    options: &IngestOptions,
) -> Result<Dataset> {
    let span = info_span!("load_dataset", source = %source_name);
    let _guard = span.enter();

    let raw = read_raw_records(bytes, source_name, &options.zero_as_missing)?;
    if raw.is_empty() {
        return Err(IngestError::Empty {
            source_name: source_name.to_string(),
        });
    }
    let Imputed {
        records,
        medians,
        filled,
    } = impute_medians(&raw)?;
    let imputed_cells: usize = filled.values().sum();
    let dataset = Dataset::new(records, medians, filled, sha256_hex(bytes));
    info!(
        records = dataset.len(),
        imputed_cells,
        fingerprint = %dataset.fingerprint(),
        "dataset loaded"
    );
    Ok(dataset)
}
