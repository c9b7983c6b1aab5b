//! Regression scores, delegated to `linfa`'s `SingleTargetRegression`.
use anyhow::{anyhow, ensure, Result};
use linfa::prelude::SingleTargetRegression;
use ndarray::Array1;

fn as_arrays(truth: &[f64], predicted: &[f64]) -> Result<(Array1<f64>, Array1<f64>)> {
    ensure!(
        truth.len() == predicted.len(),
        "Truth has {} values but predictions have {}",
        truth.len(),
        predicted.len()
    );
    ensure!(!truth.is_empty(), "Cannot score an empty prediction set");
    Ok((Array1::from(truth.to_vec()), Array1::from(predicted.to_vec())))
}

/// Coefficient of determination of `predicted` against `truth`.
pub fn r2_score(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    let (truth, predicted) = as_arrays(truth, predicted)?;
    predicted
        .r2(&truth)
        .map_err(|e| anyhow!("Failed to compute R²: {}", e))
}

pub fn mean_absolute_error(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    let (truth, predicted) = as_arrays(truth, predicted)?;
    predicted
        .mean_absolute_error(&truth)
        .map_err(|e| anyhow!("Failed to compute MAE: {}", e))
}

pub fn root_mean_squared_error(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    let (truth, predicted) = as_arrays(truth, predicted)?;
    predicted
        .mean_squared_error(&truth)
        .map(f64::sqrt)
        .map_err(|e| anyhow!("Failed to compute RMSE: {}", e))
}
