use anyhow::{anyhow, bail, Result};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};

use crate::error::TrainerError;
use crate::math::Array2;
use crate::models::fitted::FittedEstimator;
use crate::models::regressor_trait::RegressorModel;
use crate::models::utils::{ensure_finite, to_dense_matrix};

pub type SmartDecisionTree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// CART regression tree backed by `smartcore` (squared-error splits).
pub struct DecisionTreeModel {
    max_depth: Option<u16>,
    min_samples_split: usize,
    model: Option<SmartDecisionTree>,
}

impl DecisionTreeModel {
    pub fn new(max_depth: Option<u16>, min_samples_split: usize) -> Self {
        DecisionTreeModel {
            max_depth,
            min_samples_split,
            model: None,
        }
    }
}

impl RegressorModel for DecisionTreeModel {
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()> {
        ensure_finite(x, y)?;
        let mut params =
            DecisionTreeRegressorParameters::default().with_min_samples_split(self.min_samples_split);
        if let Some(depth) = self.max_depth {
            params = params.with_max_depth(depth);
        }

        let model = DecisionTreeRegressor::fit(&to_dense_matrix(x)?, &y.to_vec(), params)
            .map_err(|e| anyhow!("Decision tree fit failed: {}", e))?;
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let model = self
            .model
            .as_ref()
            .ok_or(TrainerError::NotFitted(self.name()))?;
        model
            .predict(&to_dense_matrix(x)?)
            .map_err(|e| anyhow!("Decision tree predict failed: {}", e))
    }

    fn take_fitted(&mut self) -> Result<FittedEstimator> {
        let model = self.model.take().ok_or(TrainerError::NotFitted(self.name()))?;
        Ok(FittedEstimator::DecisionTree(model))
    }

    fn load_fitted(&mut self, estimator: FittedEstimator) -> Result<()> {
        match estimator {
            FittedEstimator::DecisionTree(model) => {
                self.model = Some(model);
                Ok(())
            }
            other => bail!("Expected a decision tree model, got {}", other.family()),
        }
    }

    fn name(&self) -> &'static str {
        "decision_tree"
    }
}
