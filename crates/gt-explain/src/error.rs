use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExplainError {
    /// The explanation view should be skipped; the prediction still stands.
    #[error("explanation unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("record {index} is out of range; the dataset has {len} records")]
    RecordOutOfRange { index: usize, len: usize },
}

impl ExplainError {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        ExplainError::Unavailable {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplainError>;
