pub mod bins;
pub mod bounds;
pub mod dataset;
pub mod error;
pub mod feature;
pub mod prediction;
pub mod vector;

pub use bins::{AgeGroup, BmiCategory};
pub use bounds::{Bounds, BoundsTable};
pub use dataset::{Dataset, PatientRecord};
pub use error::{FieldIssue, IssueKind, ModelError, Result, ValidationError};
pub use feature::{Feature, MODEL_FEATURES, check_feature_order};
pub use prediction::{
    DECISION_THRESHOLD, HIGH_RISK_THRESHOLD, MODERATE_RISK_THRESHOLD, Outcome, Prediction,
    PredictionResult, RiskTier,
};
pub use vector::FeatureVector;
