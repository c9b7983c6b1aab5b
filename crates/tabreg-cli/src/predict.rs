//! Prediction with a persisted model.
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use tabreg_regressors::io::{read_feature_table, write_predictions, NumericTable};
use tabreg_regressors::math::Array2;
use tabreg_regressors::persist::{load_model, PersistedModel};

/// Pick the model's feature columns out of `table`. Columns are matched by
/// name when every feature name is present, otherwise by position.
pub fn select_features(table: &NumericTable, model: &PersistedModel) -> Result<Array2<f64>> {
    let by_name: Option<Vec<usize>> = model
        .feature_names
        .iter()
        .map(|name| table.headers.iter().position(|h| h == name))
        .collect();

    match by_name {
        Some(indices) => {
            let rows: Vec<Vec<f64>> = table
                .values
                .to_rows()
                .into_iter()
                .map(|row| indices.iter().map(|&c| row[c]).collect())
                .collect();
            Ok(Array2::from_rows(rows)?)
        }
        None if table.values.ncols() == model.n_features => Ok(table.values.clone()),
        None => Err(anyhow!(
            "Input has {} columns and lacks the model features {:?}",
            table.values.ncols(),
            model.feature_names
        )),
    }
}

pub fn run_prediction(model_path: &Path, data_path: &Path, output: Option<&Path>) -> Result<Vec<f64>> {
    let persisted = load_model(model_path)?;
    log::info!(
        "Loaded model '{}' ({}) trained with test R² {:.4}",
        persisted.name,
        persisted.model_type,
        persisted.test_r2
    );

    let table = read_feature_table(data_path).context("Failed to load prediction data")?;
    let x = select_features(&table, &persisted)?;
    persisted.check_features(&x)?;

    let model = persisted.into_regressor()?;
    let predictions = model.predict(&x)?;

    match output {
        Some(path) => {
            write_predictions(path, &predictions)?;
            log::info!("Wrote {} predictions to {}", predictions.len(), path.display());
        }
        None => {
            println!("prediction");
            for p in &predictions {
                println!("{}", p);
            }
        }
    }
    Ok(predictions)
}
