//! Dataset container and the train/test feature-target split.

use anyhow::{ensure, Result};

use crate::error::TrainerError;
use crate::math::{Array1, Array2};

/// Features, target and the feature column names of one split.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub feature_names: Vec<String>,
}

impl Dataset {
    pub fn new(x: Array2<f64>, y: Array1<f64>, feature_names: Vec<String>) -> Result<Self> {
        ensure!(
            x.nrows() == y.len(),
            "Feature matrix has {} rows but target has {} values",
            x.nrows(),
            y.len()
        );
        let feature_names = if feature_names.is_empty() {
            (0..x.ncols()).map(|i| format!("feature_{}", i)).collect()
        } else {
            feature_names
        };
        ensure!(
            feature_names.len() == x.ncols(),
            "Got {} feature names for {} feature columns",
            feature_names.len(),
            x.ncols()
        );
        Ok(Self {
            x,
            y,
            feature_names,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Rows at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select_rows(indices),
            y: self.y.select(indices),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Reject empty splits before any model sees them.
    pub fn ensure_non_empty(&self, which: &'static str) -> Result<(), TrainerError> {
        if self.x.is_empty() {
            return Err(TrainerError::EmptyDataset(which));
        }
        Ok(())
    }

    /// Train and test splits must describe the same feature columns.
    pub fn check_compatible(&self, other: &Dataset) -> Result<(), TrainerError> {
        if self.n_features() != other.n_features() {
            return Err(TrainerError::FeatureMismatch {
                expected: self.n_features(),
                found: other.n_features(),
            });
        }
        Ok(())
    }
}

/// Split a combined array into features (all but the last column) and
/// target (the last column).
pub fn split_features_target(array: &Array2<f64>, feature_names: Vec<String>) -> Result<Dataset> {
    ensure!(
        array.ncols() >= 2,
        "Need at least one feature column and a target column, got {} columns",
        array.ncols()
    );
    let target_col = array.ncols() - 1;
    let x = array.select_columns(..target_col);
    let y = array.column(target_col);
    Dataset::new(x, y, feature_names)
}
