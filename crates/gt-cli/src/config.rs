//! TOML configuration.
//!
//! Every section is optional; missing values fall back to the built-in
//! defaults. Feature names are validated here so a typo fails at startup
//! rather than silently changing the model.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gt_ingest::IngestOptions;
use gt_model::{Bounds, BoundsTable, Feature, MODEL_FEATURES, check_feature_order};
use gt_report::ReportOptions;
use gt_risk::ModelParams;
use serde::Deserialize;

pub const DEFAULT_DATASET_PATH: &str = "diabetes.csv";

/// The configuration file as written.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub dataset: DatasetSection,
    pub model: ModelSection,
    /// Feature name to `[min, max]`.
    pub bounds: BTreeMap<String, [f64; 2]>,
    pub report: ReportSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetSection {
    pub path: Option<PathBuf>,
    pub zero_as_missing: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    pub features: Option<Vec<String>>,
    pub max_iter: Option<usize>,
    pub tolerance: Option<f64>,
    pub c: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub organization: Option<String>,
    pub footer: Option<String>,
}

/// Resolved settings the commands run with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub dataset_path: PathBuf,
    pub ingest: IngestOptions,
    pub features: Vec<Feature>,
    pub params: ModelParams,
    pub bounds: BoundsTable,
    pub report: ReportOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            ingest: IngestOptions::default(),
            features: MODEL_FEATURES.to_vec(),
            params: ModelParams::default(),
            bounds: BoundsTable::default(),
            report: ReportOptions::default(),
        }
    }
}

impl ConfigFile {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read configuration {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Apply the file over the defaults.
    ///
    /// A relative `dataset.path` is taken relative to `base_dir`.
    pub fn resolve(self, base_dir: Option<&Path>) -> Result<Settings> {
        let defaults = Settings::default();

        let dataset_path = match self.dataset.path {
            Some(path) if path.is_relative() => match base_dir {
                Some(dir) => dir.join(path),
                None => path,
            },
            Some(path) => path,
            None => defaults.dataset_path,
        };

        let ingest = match self.dataset.zero_as_missing {
            Some(names) => IngestOptions::default()
                .with_zero_as_missing(parse_features(&names).context("[dataset] zero_as_missing")?),
            None => defaults.ingest,
        };

        let features = match self.model.features {
            Some(names) => {
                let features = parse_features(&names).context("[model] features")?;
                check_feature_order(&features).context("[model] features")?;
                features
            }
            None => defaults.features,
        };

        let params = ModelParams {
            c: self.model.c.unwrap_or(defaults.params.c),
            max_iter: self.model.max_iter.unwrap_or(defaults.params.max_iter),
            tolerance: self.model.tolerance.unwrap_or(defaults.params.tolerance),
        };
        params.validate().context("[model]")?;

        let overrides = self
            .bounds
            .iter()
            .map(|(name, [min, max])| {
                let feature = name.parse::<Feature>().context("[bounds]")?;
                Ok((feature, Bounds::new(*min, *max)))
            })
            .collect::<Result<Vec<_>>>()?;
        let bounds = defaults.bounds.merged(overrides).context("[bounds]")?;

        let report = ReportOptions {
            organization: self
                .report
                .organization
                .unwrap_or(defaults.report.organization),
            footer: self.report.footer.unwrap_or(defaults.report.footer),
        };

        Ok(Settings {
            dataset_path,
            ingest,
            features,
            params,
            bounds,
            report,
        })
    }
}

fn parse_features(names: &[String]) -> Result<Vec<Feature>> {
    names
        .iter()
        .map(|name| name.parse::<Feature>().map_err(anyhow::Error::from))
        .collect()
}

/// Settings from an optional configuration file and `--dataset` override.
pub fn load_settings(config: Option<&Path>, dataset: Option<&Path>) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => ConfigFile::load(path)?.resolve(path.parent())?,
        None => Settings::default(),
    };
    if let Some(path) = dataset {
        settings.dataset_path = path.to_path_buf();
    }
    Ok(settings)
}
