use anyhow::{bail, Result};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;

use crate::error::TrainerError;
use crate::math::Array2;
use crate::models::fitted::FittedEstimator;
use crate::models::regressor_trait::RegressorModel;
use crate::models::utils::{ensure_finite, to_f32_rows};

/// Gradient Boosting Decision Tree (GBDT) regressor with squared-error loss
pub struct GBDTRegressor {
    n_estimators: usize,
    learning_rate: f32,
    max_depth: u32,
    model: Option<GBDT>,
}

impl GBDTRegressor {
    pub fn new(n_estimators: usize, learning_rate: f32, max_depth: u32) -> Self {
        GBDTRegressor {
            n_estimators,
            learning_rate,
            max_depth,
            model: None,
        }
    }
}

impl RegressorModel for GBDTRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()> {
        ensure_finite(x, y)?;
        let mut config = Config::new();

        config.set_feature_size(x.ncols());
        config.set_shrinkage(self.learning_rate);
        config.set_max_depth(self.max_depth);
        config.set_iterations(self.n_estimators);
        config.set_debug(false);
        config.set_training_optimization_level(2);
        config.set_loss("SquaredError");

        let mut gbdt = GBDT::new(&config);

        let mut train_x = DataVec::new();
        for (row, &target) in to_f32_rows(x).into_iter().zip(y) {
            train_x.push(Data::new_training_data(row, 1.0, target as f32, None));
        }

        gbdt.fit(&mut train_x);

        self.model = Some(gbdt);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let model = self
            .model
            .as_ref()
            .ok_or(TrainerError::NotFitted(self.name()))?;
        let mut test_x = DataVec::new();
        for row in to_f32_rows(x) {
            test_x.push(Data::new_training_data(row, 1.0, 0.0, None));
        }
        let predictions = model.predict(&test_x);
        Ok(predictions.into_iter().map(f64::from).collect())
    }

    fn take_fitted(&mut self) -> Result<FittedEstimator> {
        let model = self.model.take().ok_or(TrainerError::NotFitted(self.name()))?;
        Ok(FittedEstimator::GradientBoosting(model))
    }

    fn load_fitted(&mut self, estimator: FittedEstimator) -> Result<()> {
        match estimator {
            FittedEstimator::GradientBoosting(model) => {
                self.model = Some(model);
                Ok(())
            }
            other => bail!("Expected a gradient boosting model, got {}", other.family()),
        }
    }

    fn name(&self) -> &'static str {
        "gradient_boosting"
    }
}
