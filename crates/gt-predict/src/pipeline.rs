use std::collections::BTreeMap;
use std::fmt::Write as _;

use gt_model::{BoundsTable, Feature, FeatureVector, Prediction, PredictionResult};
use gt_risk::{Classifier, RiskModelError};
use tracing::{debug, info, info_span, trace};

use crate::error::PredictError;
use crate::validate::{validate_raw, validate_values};

/// Placeholder logged instead of patient values.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Stateless submit path: validate, classify, return a fresh [`Prediction`].
///
/// The pipeline only borrows the classifier and bounds, so it can be built
/// per request or kept for the lifetime of a session.
pub struct PredictionPipeline<'a> {
    classifier: &'a dyn Classifier,
    bounds: &'a BoundsTable,
    log_data: bool,
}

impl<'a> PredictionPipeline<'a> {
    pub fn new(classifier: &'a dyn Classifier, bounds: &'a BoundsTable) -> Self {
        Self {
            classifier,
            bounds,
            log_data: false,
        }
    }

    /// Allow patient values in trace logs.
    #[must_use]
    pub fn with_log_data(mut self, enable: bool) -> Self {
        self.log_data = enable;
        self
    }

    pub fn features(&self) -> &[Feature] {
        self.classifier.features()
    }

    pub fn bounds(&self) -> &BoundsTable {
        self.bounds
    }

    /// Validate user-entered text and classify it.
    ///
    /// # Errors
    ///
    /// [`PredictError::Validation`] lists every offending feature; nothing is
    /// predicted in that case.
    pub fn submit(&self, raw: &BTreeMap<String, String>) -> Result<Prediction, PredictError> {
        let span = info_span!("submit", fields = raw.len());
        let _guard = span.enter();

        let ignored: Vec<&str> = raw
            .keys()
            .map(|key| key.trim())
            .filter(|key| !self.features().iter().any(|feature| feature.name() == *key))
            .collect();
        if !ignored.is_empty() {
            debug!(?ignored, "ignoring fields the model does not use");
        }

        let vector = validate_raw(raw, self.features(), self.bounds).inspect_err(|err| {
            info!(fields = ?err.features(), "submission rejected");
        })?;
        self.classify(vector)
    }

    /// Validate typed values and classify them.
    pub fn submit_values(&self, values: &[(Feature, f64)]) -> Result<Prediction, PredictError> {
        let span = info_span!("submit", fields = values.len());
        let _guard = span.enter();

        let vector = validate_values(values, self.features(), self.bounds).inspect_err(|err| {
            info!(fields = ?err.features(), "submission rejected");
        })?;
        self.classify(vector)
    }

    fn classify(&self, vector: FeatureVector) -> Result<Prediction, PredictError> {
        trace!(input = %self.describe(&vector), "classifying");
        let probability = self.classifier.predict_proba(&vector)?;
        let result = PredictionResult::from_probability(probability).ok_or_else(|| {
            RiskModelError::InvalidParameter {
                name: "probability",
                reason: format!("classifier returned {probability}"),
            }
        })?;
        info!(
            class = result.predicted_class().as_u8(),
            tier = %result.tier(),
            "prediction ready"
        );
        Ok(Prediction::new(vector, result))
    }

    fn describe(&self, vector: &FeatureVector) -> String {
        if !self.log_data {
            return REDACTED_VALUE.to_string();
        }
        let mut out = String::new();
        for (idx, (feature, value)) in vector.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{feature}={value}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use gt_model::MODEL_FEATURES;

    use super::*;

    struct Fixed(f64);

    impl Classifier for Fixed {
        fn features(&self) -> &[Feature] {
            &MODEL_FEATURES
        }

        fn predict_proba(&self, _input: &FeatureVector) -> gt_risk::Result<f64> {
            Ok(self.0)
        }
    }

    #[test]
    fn describe_redacts_unless_enabled() {
        let model = Fixed(0.2);
        let bounds = BoundsTable::default();
        let vector = FeatureVector::new(vec![(Feature::Age, 45.0)], &bounds).unwrap();

        let pipeline = PredictionPipeline::new(&model, &bounds);
        assert_eq!(pipeline.describe(&vector), REDACTED_VALUE);
        let pipeline = pipeline.with_log_data(true);
        assert_eq!(pipeline.describe(&vector), "Age=45");
    }

    #[test]
    fn out_of_range_probability_is_a_model_error() {
        let model = Fixed(1.5);
        let bounds = BoundsTable::default();
        let pipeline = PredictionPipeline::new(&model, &bounds);
        let err = pipeline
            .submit_values(&[
                (Feature::Glucose, 150.0),
                (Feature::BloodPressure, 80.0),
                (Feature::Insulin, 100.0),
                (Feature::Bmi, 28.0),
                (Feature::Age, 45.0),
            ])
            .unwrap_err();
        assert!(!err.is_validation());
    }
}
