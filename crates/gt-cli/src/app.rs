//! Dataset, fitted model and explainer shared by every command.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use gt_explain::{Attribution, LinearExplainer};
use gt_ingest::load_dataset;
use gt_model::{Dataset, Prediction};
use gt_predict::{PredictError, PredictionPipeline};
use gt_risk::RiskModel;
use tracing::{info, warn};

use crate::config::Settings;

pub struct App {
    pub settings: Settings,
    pub dataset: Dataset,
    pub model: RiskModel,
    /// `None` when explanations could not be set up; views omit them.
    pub explainer: Option<LinearExplainer>,
    pub log_data: bool,
}

impl App {
    pub fn load(settings: Settings, log_data: bool) -> Result<Self> {
        let dataset = load_dataset(&settings.dataset_path, &settings.ingest)
            .with_context(|| format!("load dataset {}", settings.dataset_path.display()))?;
        Self::from_dataset(settings, dataset, log_data)
    }

    pub fn from_dataset(settings: Settings, dataset: Dataset, log_data: bool) -> Result<Self> {
        let model = RiskModel::fit(&dataset, &settings.features, settings.params)
            .context("fit risk model")?;
        let explainer = match LinearExplainer::new(&model, &dataset) {
            Ok(explainer) => Some(explainer),
            Err(error) => {
                warn!(%error, "explanations unavailable");
                None
            }
        };
        info!(
            records = dataset.len(),
            features = settings.features.len(),
            "ready"
        );
        Ok(Self {
            settings,
            dataset,
            model,
            explainer,
            log_data,
        })
    }

    pub fn pipeline(&self) -> PredictionPipeline<'_> {
        PredictionPipeline::new(&self.model, &self.settings.bounds).with_log_data(self.log_data)
    }

    /// Submit `NAME=VALUE` pairs; a repeated name keeps its last value.
    pub fn predict(&self, assignments: &[(String, String)]) -> Result<Prediction, PredictError> {
        let raw: BTreeMap<String, String> = assignments.iter().cloned().collect();
        self.pipeline().submit(&raw)
    }

    /// Attribution for `prediction`, or `None` with a warning.
    pub fn attribution(&self, prediction: &Prediction) -> Option<Attribution> {
        let explainer = self.explainer.as_ref()?;
        match explainer.attribute(prediction.input()) {
            Ok(attribution) => Some(attribution),
            Err(error) => {
                warn!(%error, "attribution omitted");
                None
            }
        }
    }
}
