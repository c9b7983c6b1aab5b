use anyhow::{ensure, Result};

use crate::config::ModelType;
use crate::models::fitted::FittedEstimator;
use crate::models::regressor_trait::RegressorModel;

/// Build an unfitted regressor for one concrete parameter set.
pub fn build_model(model_type: &ModelType) -> Box<dyn RegressorModel> {
    match *model_type {
        ModelType::RandomForest {
            n_estimators,
            max_depth,
        } => Box::new(crate::models::random_forest::RandomForestModel::new(
            n_estimators,
            max_depth,
        )),

        ModelType::DecisionTree {
            max_depth,
            min_samples_split,
        } => Box::new(crate::models::decision_tree::DecisionTreeModel::new(
            max_depth,
            min_samples_split,
        )),

        ModelType::GradientBoosting {
            n_estimators,
            learning_rate,
            max_depth,
        } => Box::new(crate::models::gbdt::GBDTRegressor::new(
            n_estimators,
            learning_rate,
            max_depth,
        )),

        ModelType::LinearRegression { fit_intercept } => Box::new(
            crate::models::linear::LinearRegressionModel::new(fit_intercept),
        ),

        ModelType::KNeighbors { n_neighbors } => {
            Box::new(crate::models::knn::KNeighborsModel::new(n_neighbors))
        }

        #[cfg(feature = "xgboost")]
        ModelType::XGBoost {
            n_estimators,
            learning_rate,
            max_depth,
        } => Box::new(crate::models::xgboost::XGBoostRegressor::new(
            n_estimators,
            learning_rate,
            max_depth,
        )),
        // When compiled, `ModelType` only contains the variants enabled by
        // features, so no catch-all arm is necessary.
    }
}

/// Rebuild a ready-to-predict regressor from a persisted estimator.
pub fn restore_model(
    model_type: &ModelType,
    estimator: FittedEstimator,
) -> Result<Box<dyn RegressorModel>> {
    ensure!(
        model_type.family() == estimator.family(),
        "Model type {} does not match persisted estimator {}",
        model_type.family(),
        estimator.family()
    );
    let mut model = build_model(model_type);
    model.load_fitted(estimator)?;
    Ok(model)
}
