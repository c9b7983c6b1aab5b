pub mod decision_tree;
pub mod fitted;
pub mod gbdt;
pub mod knn;
pub mod linear;
pub mod random_forest;
pub mod utils;
#[cfg(feature = "xgboost")]
pub mod xgboost;

pub mod factory;
pub mod regressor_trait;

pub use fitted::FittedEstimator;
pub use regressor_trait::RegressorModel;
