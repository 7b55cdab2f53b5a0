//! Exact additive attributions for a logistic model.
//!
//! For a linear logit `b + Σ wᵢ·xᵢ` with independent background features the
//! Shapley value of feature `i` is `wᵢ·(xᵢ − E[xᵢ])`. Contributions are in
//! log-odds and sum to `logit(x) − base_value`.

use gt_model::{Dataset, Feature, FeatureVector};
use gt_risk::{RiskModel, sigmoid};
use serde::Serialize;
use tracing::{debug, info_span};

use crate::error::{ExplainError, Result};

/// Per-feature explanation of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    /// Expected log-odds over the background data.
    pub base_value: f64,
    /// Log-odds of the explained input.
    pub output_value: f64,
    /// Input values, in model feature order.
    pub values: Vec<f64>,
    /// Log-odds contribution per feature, in model feature order.
    pub contributions: Vec<(Feature, f64)>,
}

impl Attribution {
    /// Contributions by descending magnitude.
    pub fn ranked(&self) -> Vec<(Feature, f64)> {
        let mut ranked = self.contributions.clone();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        ranked
    }

    pub fn total(&self) -> f64 {
        self.contributions.iter().map(|(_, value)| value).sum()
    }

    pub fn base_probability(&self) -> f64 {
        sigmoid(self.base_value)
    }

    pub fn output_probability(&self) -> f64 {
        sigmoid(self.output_value)
    }

    pub fn contribution(&self, feature: Feature) -> Option<f64> {
        self.contributions
            .iter()
            .find(|(candidate, _)| *candidate == feature)
            .map(|(_, value)| *value)
    }
}

/// Explainer over a fitted [`RiskModel`] with the dataset as background.
///
/// Background means are computed once here; each attribution afterwards is
/// linear in the number of features.
#[derive(Debug, Clone)]
pub struct LinearExplainer {
    features: Vec<Feature>,
    weights: Vec<f64>,
    intercept: f64,
    means: Vec<f64>,
    background: Vec<Vec<f64>>,
}

impl LinearExplainer {
    pub fn new(model: &RiskModel, dataset: &Dataset) -> Result<Self> {
        let coefficients = model
            .coefficients()
            .map_err(|err| ExplainError::unavailable(err.to_string()))?;
        let intercept = model
            .intercept()
            .map_err(|err| ExplainError::unavailable(err.to_string()))?;
        if dataset.is_empty() {
            return Err(ExplainError::unavailable("background dataset is empty"));
        }

        let (features, weights): (Vec<Feature>, Vec<f64>) = coefficients.into_iter().unzip();
        let background = dataset.rows(&features);
        let count = background.len() as f64;
        let means = (0..features.len())
            .map(|idx| background.iter().map(|row| row[idx]).sum::<f64>() / count)
            .collect();
        debug!(
            features = features.len(),
            background = background.len(),
            "explainer ready"
        );
        Ok(Self {
            features,
            weights,
            intercept,
            means,
            background,
        })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Expected model output in log-odds.
    pub fn base_value(&self) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(&self.means)
                .map(|(weight, mean)| weight * mean)
                .sum::<f64>()
    }

    /// Background mean per feature.
    pub fn means(&self) -> Vec<(Feature, f64)> {
        self.features
            .iter()
            .copied()
            .zip(self.means.iter().copied())
            .collect()
    }

    pub fn attribute(&self, input: &FeatureVector) -> Result<Attribution> {
        let span = info_span!("attribute");
        let _guard = span.enter();

        if !input.matches_order(&self.features) {
            let got: Vec<&str> = input.features().map(Feature::name).collect();
            return Err(ExplainError::unavailable(format!(
                "input features [{}] differ from the model's",
                got.join(", ")
            )));
        }
        Ok(self.explain_row(&input.values()))
    }

    /// Explain the dataset record at `index`.
    pub fn attribute_record(&self, index: usize) -> Result<Attribution> {
        let span = info_span!("attribute", record = index);
        let _guard = span.enter();

        let row = self
            .background
            .get(index)
            .ok_or(ExplainError::RecordOutOfRange {
                index,
                len: self.background.len(),
            })?;
        Ok(self.explain_row(row))
    }

    /// Mean absolute contribution per feature over the background, largest
    /// first.
    pub fn global_importance(&self) -> Vec<(Feature, f64)> {
        let count = self.background.len() as f64;
        let mut importance: Vec<(Feature, f64)> = self
            .features
            .iter()
            .enumerate()
            .map(|(idx, feature)| {
                let total: f64 = self
                    .background
                    .iter()
                    .map(|row| (self.weights[idx] * (row[idx] - self.means[idx])).abs())
                    .sum();
                (*feature, total / count)
            })
            .collect();
        importance.sort_by(|a, b| b.1.total_cmp(&a.1));
        importance
    }

    /// Number of background records available to [`Self::attribute_record`].
    pub fn background_len(&self) -> usize {
        self.background.len()
    }

    fn explain_row(&self, values: &[f64]) -> Attribution {
        let contributions: Vec<(Feature, f64)> = self
            .features
            .iter()
            .enumerate()
            .map(|(idx, feature)| (*feature, self.weights[idx] * (values[idx] - self.means[idx])))
            .collect();
        let output_value = self.intercept
            + self
                .weights
                .iter()
                .zip(values)
                .map(|(weight, value)| weight * value)
                .sum::<f64>();
        Attribution {
            base_value: self.base_value(),
            output_value,
            values: values.to_vec(),
            contributions,
        }
    }
}
