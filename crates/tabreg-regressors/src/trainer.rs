//! Model selection: search every registry entry, keep the best by test R².
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};

use crate::config::{ModelCandidate, ModelType, TrainerConfig};
use crate::data_handling::Dataset;
use crate::error::TrainerError;
use crate::metrics::{mean_absolute_error, r2_score, root_mean_squared_error};
use crate::models::factory::build_model;
use crate::models::RegressorModel;
use crate::persist::PersistedModel;
use crate::report::{ModelReport, ModelScore};
use crate::search::{grid_search, KFold};

/// Report plus the refitted model behind each report entry (same order).
pub struct Evaluation {
    pub report: ModelReport,
    pub models: Vec<Box<dyn RegressorModel>>,
}

impl Evaluation {
    /// Remove and return the fitted model of `name`.
    pub fn take_model(&mut self, name: &str) -> Option<(ModelScore, Box<dyn RegressorModel>)> {
        let idx = self.report.entries.iter().position(|e| e.name == name)?;
        let score = self.report.entries[idx].clone();
        Some((score, self.models.remove(idx)))
    }
}

fn refit_and_score(
    params: &ModelType,
    train: &Dataset,
    test: &Dataset,
) -> Result<(Box<dyn RegressorModel>, f64, f64, f64)> {
    let mut model = build_model(params);
    model.fit(&train.x, train.y.as_slice())?;
    let predicted = model.predict(&test.x)?;
    let truth = test.y.as_slice();
    let r2 = r2_score(truth, &predicted)?;
    let mae = mean_absolute_error(truth, &predicted)?;
    let rmse = root_mean_squared_error(truth, &predicted)?;
    Ok((model, r2, mae, rmse))
}

/// Grid-search each candidate on `train`, refit its best parameters on all
/// of `train` and score it on `test`. Candidates that fail are logged and
/// left out of the report.
pub fn evaluate_models(
    train: &Dataset,
    test: &Dataset,
    candidates: &[ModelCandidate],
    kfold: &KFold,
    parallel: bool,
) -> Result<Evaluation> {
    let mut report = ModelReport::default();
    let mut models = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let start = Instant::now();
        let outcome = match grid_search(&candidate.search, train, kfold, parallel) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("{}: search failed: {:#}", candidate.name, e);
                continue;
            }
        };

        let (model, test_r2, test_mae, test_rmse) =
            match refit_and_score(&outcome.best_params, train, test) {
                Ok(result) => result,
                Err(e) => {
                    log::warn!("{}: refit failed: {:#}", candidate.name, e);
                    continue;
                }
            };

        log::info!(
            "{}: best [{}] test R² {:.4} ({:?})",
            candidate.name,
            outcome.best_params,
            test_r2,
            start.elapsed()
        );

        report.push(ModelScore {
            name: candidate.name.clone(),
            best_params: outcome.best_params,
            cv_score: outcome.best_cv_score,
            test_r2,
            test_mae,
            test_rmse,
        });
        models.push(model);
    }

    Ok(Evaluation { report, models })
}

/// What a successful training run produced.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best_model_name: String,
    pub best_params: ModelType,
    /// R² of the persisted model on the test split.
    pub test_r2: f64,
    pub model_path: PathBuf,
    pub report: ModelReport,
}

pub struct ModelTrainer {
    pub config: TrainerConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Fold splitter described by `cv_folds`, `shuffle_folds` and `seed`.
    pub fn kfold(&self) -> KFold {
        let kfold = KFold::new(self.config.cv_folds);
        if self.config.shuffle_folds {
            kfold.with_shuffle(self.config.seed)
        } else {
            kfold
        }
    }

    fn validate(&self, train: &Dataset, test: &Dataset) -> Result<()> {
        train.ensure_non_empty("training")?;
        test.ensure_non_empty("test")?;
        train.check_compatible(test)?;
        // Tuned candidates all need the training rows split into folds.
        self.kfold()
            .split(train.n_samples())
            .context("Invalid cross-validation settings")?;

        if self.config.candidates.is_empty() {
            bail!("No candidate models configured");
        }
        let mut names = HashSet::new();
        for candidate in &self.config.candidates {
            if !names.insert(candidate.name.as_str()) {
                bail!("Duplicate candidate model name: {}", candidate.name);
            }
        }
        Ok(())
    }

    /// Run the full selection: search, pick the best by test R², enforce the
    /// threshold, persist the winner and its report, and return the winner's
    /// R² on the test split.
    pub fn initiate_model_trainer(&self, train: &Dataset, test: &Dataset) -> Result<TrainingOutcome> {
        log::info!(
            "Splitting training and test input data: {} train rows, {} test rows, {} features",
            train.n_samples(),
            test.n_samples(),
            train.n_features()
        );
        self.validate(train, test)?;

        let mut evaluation = evaluate_models(
            train,
            test,
            &self.config.candidates,
            &self.kfold(),
            self.config.parallel,
        )?;

        let best = evaluation
            .report
            .best()
            .cloned()
            .ok_or(TrainerError::EmptyReport)?;

        if best.test_r2 < self.config.min_r2 {
            return Err(TrainerError::NoBestModel {
                best_model: best.name,
                best_score: best.test_r2,
                threshold: self.config.min_r2,
            }
            .into());
        }
        log::info!(
            "Best found model on both training and testing dataset: {} (R² {:.4})",
            best.name,
            best.test_r2
        );

        let report = evaluation.report.clone();
        let (score, mut model) = evaluation
            .take_model(&best.name)
            .ok_or(TrainerError::EmptyReport)?;

        let predicted = model.predict(&test.x)?;
        let r2_square = r2_score(test.y.as_slice(), &predicted)?;

        let model_path = self.config.trained_model_file_path.clone();
        PersistedModel::new(
            score.name.clone(),
            score.best_params.clone(),
            r2_square,
            train.feature_names.clone(),
            model.take_fitted()?,
        )
        .save(&model_path)
        .context("Failed to persist the best model")?;
        log::info!("Model saved to: {}", model_path.display());

        if let Some(report_path) = &self.config.report_file_path {
            report
                .write_json(report_path)
                .context("Failed to write the model report")?;
            log::info!("Model report saved to: {}", report_path.display());
        }

        Ok(TrainingOutcome {
            best_model_name: score.name,
            best_params: score.best_params,
            test_r2: r2_square,
            model_path,
            report,
        })
    }
}
