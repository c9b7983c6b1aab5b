use std::error::Error;
use std::fmt;

/// Failures of the model selection run that callers may want to match on.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainerError {
    /// The best held-out R² did not reach the configured threshold.
    NoBestModel {
        best_model: String,
        best_score: f64,
        threshold: f64,
    },
    /// Train and test feature counts differ.
    FeatureMismatch { expected: usize, found: usize },
    /// A dataset without rows or without feature columns.
    EmptyDataset(&'static str),
    /// `predict` was called before `fit`.
    NotFitted(&'static str),
    /// Every candidate failed to produce a test score.
    EmptyReport,
}

impl fmt::Display for TrainerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrainerError::NoBestModel {
                best_model,
                best_score,
                threshold,
            } => write!(
                f,
                "No best model found: {} scored R² {:.4}, below the required {:.4}",
                best_model, best_score, threshold
            ),
            TrainerError::FeatureMismatch { expected, found } => write!(
                f,
                "Feature count mismatch: expected {} columns, found {}",
                expected, found
            ),
            TrainerError::EmptyDataset(which) => write!(f, "The {} dataset is empty", which),
            TrainerError::NotFitted(name) => {
                write!(f, "Model '{}' must be fitted before predicting", name)
            }
            TrainerError::EmptyReport => write!(f, "No model produced a test score"),
        }
    }
}

impl Error for TrainerError {}
