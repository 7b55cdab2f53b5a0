//! Prediction pipeline: turns user-entered values into a [`Prediction`].
//!
//! [`Prediction`]: gt_model::Prediction

pub mod error;
pub mod pipeline;
pub mod validate;

pub use error::PredictError;
pub use pipeline::{PredictionPipeline, REDACTED_VALUE};
pub use validate::{parse_value, validate_raw, validate_values};
