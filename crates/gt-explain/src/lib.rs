//! Feature attributions for individual predictions and for the dataset as a
//! whole.

pub mod error;
pub mod linear;

pub use error::{ExplainError, Result};
pub use linear::{Attribution, LinearExplainer};
