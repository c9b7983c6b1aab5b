use anyhow::{anyhow, bail, Result};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::TrainerError;
use crate::math::Array2;
use crate::models::fitted::FittedEstimator;
use crate::models::regressor_trait::RegressorModel;
use crate::models::utils::{ensure_finite, to_dense_matrix};

pub type SmartRandomForest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Random forest regressor backed by `smartcore`.
pub struct RandomForestModel {
    n_estimators: usize,
    max_depth: Option<u16>,
    model: Option<SmartRandomForest>,
}

impl RandomForestModel {
    pub fn new(n_estimators: usize, max_depth: Option<u16>) -> Self {
        RandomForestModel {
            n_estimators,
            max_depth,
            model: None,
        }
    }
}

impl RegressorModel for RandomForestModel {
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()> {
        ensure_finite(x, y)?;
        let mut params = RandomForestRegressorParameters::default().with_n_trees(self.n_estimators as _);
        if let Some(depth) = self.max_depth {
            params = params.with_max_depth(depth);
        }

        let model = RandomForestRegressor::fit(&to_dense_matrix(x)?, &y.to_vec(), params)
            .map_err(|e| anyhow!("Random forest fit failed: {}", e))?;
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
            .map_err(|e| anyhow!("Random forest predict failed: {}", e))
    }

    fn take_fitted(&mut self) -> Result<FittedEstimator> {
        let model = self.model.take().ok_or(TrainerError::NotFitted(self.name()))?;
        Ok(FittedEstimator::RandomForest(model))
    }

    fn load_fitted(&mut self, estimator: FittedEstimator) -> Result<()> {
        match estimator {
            FittedEstimator::RandomForest(model) => {
                self.model = Some(model);
                Ok(())
            }
            other => bail!("Expected a random forest model, got {}", other.family()),
        }
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_forest_regressor() {
        // y = 2 * x0 on a small grid
        let rows: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = rows.iter().map(|r| 2.0 * r[0]).collect();
        let x = Array2::from_rows(rows).unwrap();

        let mut model = RandomForestModel::new(20, None);
        assert!(model.predict(&x).is_err());

        model.fit(&x, &y).unwrap();
        let predictions = model.predict(&x).unwrap();
        assert_eq!(predictions.len(), y.len());

        let max_err = predictions
            .iter()
            .zip(&y)
            .map(|(p, t)| (p - t).abs())
            .fold(0.0, f64::max);
        assert!(max_err < 15.0, "max error {}", max_err);
    }
}
