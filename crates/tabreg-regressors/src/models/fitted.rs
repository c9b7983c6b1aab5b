//! Serializable snapshots of fitted library models.
use serde::{Deserialize, Serialize};

use crate::models::decision_tree::SmartDecisionTree;
use crate::models::knn::SmartKnn;
use crate::models::random_forest::SmartRandomForest;

/// A fitted estimator in the library's own serde representation.
#[derive(Serialize, Deserialize)]
pub enum FittedEstimator {
    RandomForest(SmartRandomForest),
    DecisionTree(SmartDecisionTree),
    KNeighbors(SmartKnn),
    LinearRegression(linfa_linear::FittedLinearRegression<f64>),
    GradientBoosting(gbdt::gradient_boost::GBDT),
    /// Raw XGBoost model buffer as produced by `Booster::save_buffer`.
    #[cfg(feature = "xgboost")]
    XGBoost(Vec<u8>),
}

impl FittedEstimator {
    pub fn family(&self) -> &'static str {
        match self {
            FittedEstimator::RandomForest(_) => "random_forest",
            FittedEstimator::DecisionTree(_) => "decision_tree",
            FittedEstimator::KNeighbors(_) => "k_neighbors",
            FittedEstimator::LinearRegression(_) => "linear_regression",
            FittedEstimator::GradientBoosting(_) => "gradient_boosting",
            #[cfg(feature = "xgboost")]
            FittedEstimator::XGBoost(_) => "xgboost",
        }
    }
}

impl std::fmt::Debug for FittedEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FittedEstimator({})", self.family())
    }
}
