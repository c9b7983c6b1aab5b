//! tabreg-regressors: model search and selection for tabular regression.
//!
//! The crate trains a registry of off-the-shelf regressors (random forest,
//! decision tree, k-NN, linear regression, gradient boosting and, behind the
//! `xgboost` feature, XGBoost) on a pre-split dataset, tunes each one with a
//! small grid search, keeps the best by held-out R² and persists it.
//!
//! Every estimator, the R² metric and model serialization come from the
//! backing libraries (`smartcore`, `linfa`, `gbdt`, `xgb`); this crate only
//! orchestrates them.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod math;
pub mod metrics;
pub mod models;
pub mod persist;
pub mod report;
pub mod search;
pub mod trainer;
