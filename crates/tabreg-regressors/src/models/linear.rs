use anyhow::{anyhow, bail, Result};
use linfa::prelude::*;
use linfa_linear::{FittedLinearRegression, LinearRegression};

use crate::error::TrainerError;
use crate::math::Array2;
use crate::models::fitted::FittedEstimator;
use crate::models::regressor_trait::RegressorModel;
use crate::models::utils::{ensure_finite, to_ndarray};

/// Ordinary least squares backed by `linfa-linear`.
pub struct LinearRegressionModel {
    fit_intercept: bool,
    model: Option<FittedLinearRegression<f64>>,
}

impl LinearRegressionModel {
    pub fn new(fit_intercept: bool) -> Self {
        LinearRegressionModel {
            fit_intercept,
            model: None,
        }
    }
}

impl RegressorModel for LinearRegressionModel {
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()> {
        ensure_finite(x, y)?;
        let dataset = Dataset::new(to_ndarray(x)?, ndarray::Array1::from(y.to_vec()));

        let model = LinearRegression::new()
            .with_intercept(self.fit_intercept)
            .fit(&dataset)
            .map_err(|e| anyhow!("Linear regression fit failed: {}", e))?;
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let model = self
            .model
            .as_ref()
            .ok_or(TrainerError::NotFitted(self.name()))?;
        let predictions: ndarray::Array1<f64> = model.predict(&to_ndarray(x)?);
        Ok(predictions.to_vec())
    }

    fn take_fitted(&mut self) -> Result<FittedEstimator> {
        let model = self.model.take().ok_or(TrainerError::NotFitted(self.name()))?;
        Ok(FittedEstimator::LinearRegression(model))
    }

    fn load_fitted(&mut self, estimator: FittedEstimator) -> Result<()> {
        match estimator {
            FittedEstimator::LinearRegression(model) => {
                self.model = Some(model);
                Ok(())
            }
            other => bail!("Expected a linear regression model, got {}", other.family()),
        }
    }

    fn name(&self) -> &'static str {
        "linear_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_linear_relation() {
        // y = 3 * x0 - 2 * x1 + 1
        let rows = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![2.0, 3.0],
            vec![3.0, 1.0],
            vec![4.0, 5.0],
            vec![5.0, 2.0],
        ];
        let y: Vec<f64> = rows.iter().map(|r| 3.0 * r[0] - 2.0 * r[1] + 1.0).collect();
        let x = Array2::from_rows(rows).unwrap();

        let mut model = LinearRegressionModel::new(true);
        model.fit(&x, &y).unwrap();

        let query = Array2::from_shape_vec((1, 2), vec![10.0, 10.0]).unwrap();
        let prediction = model.predict(&query).unwrap();
        assert!((prediction[0] - 11.0).abs() < 1e-6, "{:?}", prediction);
    }

    #[test]
    fn persisted_state_moves_out() {
        let x = Array2::from_shape_vec((3, 1), vec![0.0, 1.0, 2.0]).unwrap();
        let mut model = LinearRegressionModel::new(true);
        model.fit(&x, &[1.0, 3.0, 5.0]).unwrap();

        let fitted = model.take_fitted().unwrap();
        assert_eq!(fitted.family(), "linear_regression");
        assert!(model.predict(&x).is_err());

        model.load_fitted(fitted).unwrap();
        assert_eq!(model.predict(&x).unwrap().len(), 3);
    }
}
