use anyhow::Result;

use crate::math::Array2;
use crate::models::fitted::FittedEstimator;

/// Contract shared by every estimator wrapper. Fitting and prediction are
/// delegated to the backing library; the wrapper only converts data layouts.
pub trait RegressorModel {
    /// Fit on `x` (rows are samples) and the matching target values.
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()>;

    /// Predict one value per row of `x`. Errors if the model is not fitted.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>>;

    /// Move the fitted library model out for persistence.
    fn take_fitted(&mut self) -> Result<FittedEstimator>;

    /// Install a previously persisted library model.
    fn load_fitted(&mut self, estimator: FittedEstimator) -> Result<()>;

    /// Human readable family name
    fn name(&self) -> &'static str {
        "regressor"
    }
}
