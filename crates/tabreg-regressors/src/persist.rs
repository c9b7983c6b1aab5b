//! On-disk form of the selected model.
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ModelType;
use crate::error::TrainerError;
use crate::math::Array2;
use crate::models::factory::restore_model;
use crate::models::{FittedEstimator, RegressorModel};
use crate::report::ensure_parent;

pub const FORMAT_VERSION: u32 = 1;

/// The winning estimator plus what is needed to use it later.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedModel {
    pub format_version: u32,
    pub name: String,
    pub model_type: ModelType,
    pub test_r2: f64,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub created_at: String,
    pub estimator: FittedEstimator,
}

impl PersistedModel {
    pub fn new(
        name: String,
        model_type: ModelType,
        test_r2: f64,
        feature_names: Vec<String>,
        estimator: FittedEstimator,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            name,
            model_type,
            test_r2,
            n_features: feature_names.len(),
            feature_names,
            created_at: chrono::Utc::now().to_rfc3339(),
            estimator,
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        ensure_parent(path)?;
        let file = File::create(path)
            .with_context(|| format!("Failed to create model file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to serialize model to {}", path.display()))?;
        log::debug!("Wrote {} model to {}", self.name, path.display());
        Ok(())
    }

    pub fn check_features(&self, x: &Array2<f64>) -> Result<(), TrainerError> {
        if x.ncols() != self.n_features {
            return Err(TrainerError::FeatureMismatch {
                expected: self.n_features,
                found: x.ncols(),
            });
        }
        Ok(())
    }

    /// Turn the persisted estimator back into a predicting regressor.
    pub fn into_regressor(self) -> Result<Box<dyn RegressorModel>> {
        restore_model(&self.model_type, self.estimator)
            .with_context(|| format!("Failed to restore model '{}'", self.name))
    }
}

pub fn load_model<P: AsRef<Path>>(path: P) -> Result<PersistedModel> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open model file: {}", path.display()))?;
    let model: PersistedModel = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse model file: {}", path.display()))?;
    anyhow::ensure!(
        model.format_version == FORMAT_VERSION,
        "Unsupported model format version {} in {}",
        model.format_version,
        path.display()
    );
    Ok(model)
}

/// Load a model file and predict every row of `x`.
pub fn predict_with_saved_model<P: AsRef<Path>>(path: P, x: &Array2<f64>) -> Result<Vec<f64>> {
    let persisted = load_model(path)?;
    persisted.check_features(x)?;
    let model = persisted.into_regressor()?;
    model.predict(x)
}
