//! Personal analytics for one prediction.

use gt_model::{Bounds, Dataset, Feature, FeatureVector, Outcome, Prediction, RiskTier};
use gt_predict::{PredictError, PredictionPipeline};
use serde::Serialize;
use tracing::debug;

/// An input value next to the class averages of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureComparison {
    pub feature: Feature,
    pub input: f64,
    pub non_diabetic_mean: Option<f64>,
    pub diabetic_mean: Option<f64>,
}

pub fn compare_with_classes(dataset: &Dataset, input: &FeatureVector) -> Vec<FeatureComparison> {
    input
        .iter()
        .map(|(feature, value)| FeatureComparison {
            feature,
            input: value,
            non_diabetic_mean: dataset.class_mean(feature, Outcome::NoDiabetes),
            diabetic_mean: dataset.class_mean(feature, Outcome::Diabetes),
        })
        .collect()
}

/// Input values min-max scaled over the dataset's observed range.
///
/// Values outside the observed range scale below 0 or above 1. A constant
/// column scales to 0.
pub fn radar_profile(dataset: &Dataset, input: &FeatureVector) -> Vec<(Feature, f64)> {
    input
        .iter()
        .map(|(feature, value)| {
            let scaled = match dataset.observed_range(feature) {
                Some(range) if range.max > range.min => {
                    (value - range.min) / (range.max - range.min)
                }
                _ => 0.0,
            };
            (feature, scaled)
        })
        .collect()
}

/// Text bar filled in proportion to `probability`.
pub fn risk_bar(probability: f64, width: usize) -> String {
    let filled = ((probability.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat_n('█', filled));
    bar.extend(std::iter::repeat_n('░', width - filled));
    bar
}

/// Result of re-predicting with adjusted values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactTest {
    pub baseline_probability: f64,
    pub prediction: Prediction,
    /// Features whose requested value was pulled into the allowed range.
    pub clamped: Vec<Feature>,
}

impl ImpactTest {
    pub fn probability(&self) -> f64 {
        self.prediction.probability()
    }

    pub fn tier(&self) -> RiskTier {
        self.prediction.tier()
    }

    /// Change in probability against the original prediction.
    pub fn delta(&self) -> f64 {
        self.probability() - self.baseline_probability
    }
}

/// Range an adjusted value may take: the dataset's observed range narrowed
/// to the submission bounds.
///
/// When the two do not overlap the submission bounds apply alone.
pub fn adjustment_range(
    pipeline: &PredictionPipeline<'_>,
    dataset: &Dataset,
    feature: Feature,
) -> Bounds {
    let accepted = pipeline.bounds().get(feature);
    let Some(observed) = dataset.observed_range(feature) else {
        return accepted;
    };
    let min = observed.min.max(accepted.min);
    let max = observed.max.min(accepted.max);
    if min <= max {
        Bounds::new(min, max)
    } else {
        accepted
    }
}

/// Re-predict `base` with some features replaced.
///
/// Adjusted values are clamped into [`adjustment_range`], so every
/// adjustment yields a prediction; untouched features keep their input value.
pub fn feature_impact(
    pipeline: &PredictionPipeline<'_>,
    dataset: &Dataset,
    base: &Prediction,
    adjustments: &[(Feature, f64)],
) -> Result<ImpactTest, PredictError> {
    let mut clamped = Vec::new();
    let values: Vec<(Feature, f64)> = base
        .input()
        .iter()
        .map(|(feature, value)| {
            let Some(requested) = adjustments
                .iter()
                .rev()
                .find(|(candidate, _)| *candidate == feature)
                .map(|(_, requested)| *requested)
            else {
                return (feature, value);
            };
            let range = adjustment_range(pipeline, dataset, feature);
            if range.contains(requested) {
                (feature, requested)
            } else {
                clamped.push(feature);
                (feature, range.clamp(requested))
            }
        })
        .collect();
    debug!(adjusted = adjustments.len(), clamped = clamped.len(), "testing feature impact");
    let prediction = pipeline.submit_values(&values)?;
    Ok(ImpactTest {
        baseline_probability: base.probability(),
        prediction,
        clamped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_bar_scales_with_probability() {
        assert_eq!(risk_bar(0.0, 4), "░░░░");
        assert_eq!(risk_bar(0.5, 4), "██░░");
        assert_eq!(risk_bar(1.0, 4), "████");
        assert_eq!(risk_bar(3.0, 4), "████");
        assert_eq!(risk_bar(0.55, 10).chars().filter(|c| *c == '█').count(), 6);
    }
}
