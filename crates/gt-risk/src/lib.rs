//! Diabetes risk model.
//!
//! [`RiskModel`] fits an L2-regularised logistic regression on the imputed
//! dataset and serves probabilities through the [`Classifier`] trait, which
//! the prediction pipeline depends on instead of the concrete model.

pub mod error;
pub mod logistic;
pub mod model;

pub use error::{Result, RiskModelError};
pub use logistic::{LogisticRegression, ModelParams, sigmoid};
pub use model::{Classifier, RiskModel};
