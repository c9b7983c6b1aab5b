use anyhow::{anyhow, bail, ensure, Result};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::distance::euclidian::Euclidian;
use smartcore::neighbors::knn_regressor::{KNNRegressor, KNNRegressorParameters};

use crate::error::TrainerError;
use crate::math::Array2;
use crate::models::fitted::FittedEstimator;
use crate::models::regressor_trait::RegressorModel;
use crate::models::utils::{ensure_finite, to_dense_matrix};

pub type SmartKnn = KNNRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>, Euclidian<f64>>;

/// k-nearest-neighbours regressor backed by `smartcore` (uniform weights,
/// Euclidean distance).
pub struct KNeighborsModel {
    n_neighbors: usize,
    model: Option<SmartKnn>,
}

impl KNeighborsModel {
    pub fn new(n_neighbors: usize) -> Self {
        KNeighborsModel {
            n_neighbors,
            model: None,
        }
    }
}

impl RegressorModel for KNeighborsModel {
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()> {
        ensure_finite(x, y)?;
        ensure!(
            self.n_neighbors > 0 && self.n_neighbors <= x.nrows(),
            "n_neighbors = {} needs between 1 and {} training samples",
            self.n_neighbors,
            x.nrows()
        );
        let params: KNNRegressorParameters<f64, Euclidian<f64>> =
            KNNRegressorParameters::default().with_k(self.n_neighbors);

        let model = KNNRegressor::fit(&to_dense_matrix(x)?, &y.to_vec(), params)
            .map_err(|e| anyhow!("k-NN fit failed: {}", e))?;
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
            .map_err(|e| anyhow!("k-NN predict failed: {}", e))
    }

    fn take_fitted(&mut self) -> Result<FittedEstimator> {
        let model = self.model.take().ok_or(TrainerError::NotFitted(self.name()))?;
        Ok(FittedEstimator::KNeighbors(model))
    }

    fn load_fitted(&mut self, estimator: FittedEstimator) -> Result<()> {
        match estimator {
            FittedEstimator::KNeighbors(model) => {
                self.model = Some(model);
                Ok(())
            }
            other => bail!("Expected a k-NN model, got {}", other.family()),
        }
    }

    fn name(&self) -> &'static str {
        "k_neighbors"
    }
}
