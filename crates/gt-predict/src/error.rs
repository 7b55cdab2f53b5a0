use gt_model::ValidationError;
use gt_risk::RiskModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("risk model failed: {0}")]
    Model(#[from] RiskModelError),
}

impl PredictError {
    /// Whether the caller can fix the input and resubmit.
    pub fn is_validation(&self) -> bool {
        matches!(self, PredictError::Validation(_))
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            PredictError::Validation(err) => Some(err),
            PredictError::Model(_) => None,
        }
    }
}
