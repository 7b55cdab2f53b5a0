use gt_model::{Feature, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskModelError {
    #[error("model has not been fitted")]
    NotFitted,

    #[error("dimension mismatch: expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("training labels contain a single class")]
    SingleClass,

    #[error("hessian is singular at iteration {iteration}")]
    SingularHessian { iteration: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("feature order mismatch: model expects [{}], got [{}]", join(.expected), join(.got))]
    FeatureMismatch {
        expected: Vec<Feature>,
        got: Vec<Feature>,
    },

    #[error(transparent)]
    Features(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, RiskModelError>;

fn join(features: &[Feature]) -> String {
    features
        .iter()
        .map(|feature| feature.name())
        .collect::<Vec<_>>()
        .join(", ")
}
