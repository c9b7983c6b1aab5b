use anyhow::{anyhow, bail, Result};
use log::debug;
use xgb::{
    parameters::{
        learning::{LearningTaskParametersBuilder, Objective},
        tree::{TreeBoosterParametersBuilder, TreeMethod},
        BoosterParametersBuilder, BoosterType,
    },
    Booster, DMatrix,
};

use crate::error::TrainerError;
use crate::math::Array2;
use crate::models::fitted::FittedEstimator;
use crate::models::regressor_trait::RegressorModel;
use crate::models::utils::ensure_finite;

fn to_dmatrix(x: &Array2<f64>) -> Result<DMatrix> {
    let data: Vec<f32> = x.as_slice().iter().map(|&v| v as f32).collect();
    debug!(
        "Creating DMatrix from dense data: rows={}, cols={}, len={}",
        x.nrows(),
        x.ncols(),
        data.len()
    );
    // `from_dense` expects the number of rows as the second argument.
    DMatrix::from_dense(&data, x.nrows()).map_err(|e| anyhow!("Failed to build DMatrix: {}", e))
}

pub struct XGBoostRegressor {
    n_estimators: u32,
    learning_rate: f32,
    max_depth: u32,
    booster: Option<Booster>,
}

impl XGBoostRegressor {
    pub fn new(n_estimators: u32, learning_rate: f32, max_depth: u32) -> Self {
        XGBoostRegressor {
            n_estimators,
            learning_rate,
            max_depth,
            booster: None,
        }
    }
}

impl RegressorModel for XGBoostRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()> {
        ensure_finite(x, y)?;
        let mut dmat = to_dmatrix(x)?;
        dmat.set_labels(&y.iter().map(|&v| v as f32).collect::<Vec<f32>>())
            .map_err(|e| anyhow!("Failed to set labels: {}", e))?;

        let learning_params = LearningTaskParametersBuilder::default()
            .objective(Objective::RegLinear)
            .build()
            .map_err(anyhow::Error::msg)?;

        let tree_params = TreeBoosterParametersBuilder::default()
            .tree_method(TreeMethod::Hist)
            .max_depth(self.max_depth)
            .eta(self.learning_rate)
            .build()
            .map_err(anyhow::Error::msg)?;

        let booster_params = BoosterParametersBuilder::default()
            .booster_type(BoosterType::Tree(tree_params))
            .learning_params(learning_params)
            .verbose(false)
            .build()
            .map_err(anyhow::Error::msg)?;

        // Drive the update loop explicitly so every round adds trees.
        let mut bst = Booster::new_with_cached_dmats(&booster_params, &[&dmat])
            .map_err(|e| anyhow!("Failed to create Booster: {}", e))?;
        for i in 0..self.n_estimators as i32 {
            bst.update(&dmat, i)
                .map_err(|e| anyhow!("Boosting round {} failed: {}", i, e))?;
        }

        self.booster = Some(bst);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let booster = self
            .booster
            .as_ref()
            .ok_or(TrainerError::NotFitted(self.name()))?;
        let predictions = booster
            .predict(&to_dmatrix(x)?)
            .map_err(|e| anyhow!("XGBoost predict failed: {}", e))?;
        Ok(predictions.into_iter().map(f64::from).collect())
    }

    fn take_fitted(&mut self) -> Result<FittedEstimator> {
        let booster = self
            .booster
            .take()
            .ok_or(TrainerError::NotFitted(self.name()))?;
        let buffer = booster
            .save_buffer(true)
            .map_err(|e| anyhow!("Failed to serialize booster: {}", e))?;
        Ok(FittedEstimator::XGBoost(buffer))
    }

    fn load_fitted(&mut self, estimator: FittedEstimator) -> Result<()> {
        match estimator {
            FittedEstimator::XGBoost(buffer) => {
                let booster = Booster::load_buffer(&buffer)
                    .map_err(|e| anyhow!("Failed to load booster: {}", e))?;
                self.booster = Some(booster);
                Ok(())
            }
            other => bail!("Expected an XGBoost model, got {}", other.family()),
        }
    }

    fn name(&self) -> &'static str {
        "xgboost"
    }
}
