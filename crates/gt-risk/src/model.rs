use gt_model::{Dataset, Feature, FeatureVector, Outcome, check_feature_order};
use ndarray::{Array1, Array2};
use tracing::{info, info_span};

use crate::error::{Result, RiskModelError};
use crate::logistic::{LogisticRegression, ModelParams};

/// Anything that turns a validated feature vector into a diabetes probability.
pub trait Classifier {
    /// Features the classifier expects, in order.
    fn features(&self) -> &[Feature];

    fn predict_proba(&self, input: &FeatureVector) -> Result<f64>;

    /// Class implied by the probability at the 0.5 threshold.
    fn predict(&self, input: &FeatureVector) -> Result<Outcome> {
        Ok(Outcome::from_probability(self.predict_proba(input)?))
    }
}

/// Logistic regression bound to a feature order.
#[derive(Debug, Clone)]
pub struct RiskModel {
    features: Vec<Feature>,
    regression: LogisticRegression,
}

impl RiskModel {
    /// An unfitted model over `features`.
    pub fn new(features: &[Feature], params: ModelParams) -> Result<Self> {
        check_feature_order(features)?;
        params.validate()?;
        Ok(Self {
            features: features.to_vec(),
            regression: LogisticRegression::new(params),
        })
    }

    /// Fit a model on every record of `dataset`.
    pub fn fit(dataset: &Dataset, features: &[Feature], params: ModelParams) -> Result<Self> {
        let mut model = Self::new(features, params)?;
        model.train(dataset)?;
        Ok(model)
    }

    /// A fitted model with known coefficients, one per feature.
    pub fn from_coefficients(
        features: &[Feature],
        intercept: f64,
        coefficients: Vec<f64>,
    ) -> Result<Self> {
        check_feature_order(features)?;
        if coefficients.len() != features.len() {
            return Err(RiskModelError::DimensionMismatch {
                expected: features.len(),
                got: coefficients.len(),
            });
        }
        Ok(Self {
            features: features.to_vec(),
            regression: LogisticRegression::from_parts(intercept, coefficients)?,
        })
    }

    /// (Re)fit on `dataset`, replacing any previous parameters.
    pub fn train(&mut self, dataset: &Dataset) -> Result<()> {
        let span = info_span!("fit", records = dataset.len(), features = self.features.len());
        let _guard = span.enter();

        let x = self.design_matrix(&dataset.rows(&self.features))?;
        let y = Array1::from_vec(dataset.labels());
        self.regression.fit(&x, &y)?;

        let accuracy = self.accuracy(dataset)?;
        info!(
            iterations = self.regression.iterations(),
            converged = self.regression.converged(),
            accuracy,
            "risk model fitted"
        );
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.regression.is_fitted()
    }

    pub fn params(&self) -> ModelParams {
        self.regression.params()
    }

    pub fn intercept(&self) -> Result<f64> {
        self.regression.intercept()
    }

    /// Coefficients paired with their features, in model order.
    pub fn coefficients(&self) -> Result<Vec<(Feature, f64)>> {
        let coefficients = self.regression.coefficients()?;
        Ok(self
            .features
            .iter()
            .copied()
            .zip(coefficients.iter().copied())
            .collect())
    }

    /// Log-odds of a diabetes outcome for `input`.
    pub fn logit(&self, input: &FeatureVector) -> Result<f64> {
        self.check_order(input)?;
        self.regression.decision_function(&input.values())
    }

    /// Share of `dataset` records the model classifies correctly.
    pub fn accuracy(&self, dataset: &Dataset) -> Result<f64> {
        if dataset.is_empty() {
            return Err(RiskModelError::EmptyTrainingSet);
        }
        let mut correct = 0usize;
        for record in dataset.records() {
            if self.regression.predict(&record.row(&self.features))? == record.outcome {
                correct += 1;
            }
        }
        Ok(correct as f64 / dataset.len() as f64)
    }

    /// Stack `rows` into an `n × features` matrix; a row of another width is
    /// reported with its actual length.
    fn design_matrix(&self, rows: &[Vec<f64>]) -> Result<Array2<f64>> {
        let width = self.features.len();
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(RiskModelError::DimensionMismatch {
                expected: width,
                got: row.len(),
            });
        }
        Ok(Array2::from_shape_fn((rows.len(), width), |(i, j)| rows[i][j]))
    }

    fn check_order(&self, input: &FeatureVector) -> Result<()> {
        if input.matches_order(&self.features) {
            Ok(())
        } else {
            Err(RiskModelError::FeatureMismatch {
                expected: self.features.clone(),
                got: input.features().collect(),
            })
        }
    }
}

impl Classifier for RiskModel {
    fn features(&self) -> &[Feature] {
        &self.features
    }

    fn predict_proba(&self, input: &FeatureVector) -> Result<f64> {
        self.check_order(input)?;
        self.regression.predict_proba(&input.values())
    }
}
