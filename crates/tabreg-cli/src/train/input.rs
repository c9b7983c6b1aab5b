use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use tabreg_regressors::config::TrainerConfig;

use crate::util::{split_list, validate_tsv_or_csv_file};

/// Everything a `tabreg train` run needs: the data splits plus the trainer
/// settings, which sit at the top level of the JSON file.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct TrainRunConfig {
    pub train_data: String,
    pub test_data: String,
    /// Target column name; the last column when absent.
    pub target_column: Option<String>,
    pub html_report: Option<String>,
    #[serde(flatten)]
    pub trainer: TrainerConfig,
}

impl Default for TrainRunConfig {
    fn default() -> Self {
        TrainRunConfig {
            train_data: String::new(),
            test_data: String::new(),
            target_column: None,
            html_report: Some(String::from("artifacts/model_report.html")),
            trainer: TrainerConfig::default(),
        }
    }
}

impl TrainRunConfig {
    pub fn from_file(config_path: &PathBuf) -> Result<Self> {
        let config_json = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        serde_json::from_str(&config_json)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))
    }

    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => TrainRunConfig::default(),
        };

        // Apply CLI overrides
        if let Some(train_data) = matches.get_one::<String>("train_data") {
            config.train_data = train_data.clone();
        }
        validate_tsv_or_csv_file(&config.train_data)?;

        if let Some(test_data) = matches.get_one::<String>("test_data") {
            config.test_data = test_data.clone();
        }
        validate_tsv_or_csv_file(&config.test_data)?;

        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.trainer.trained_model_file_path = PathBuf::from(output_file);
        }

        if let Some(target) = matches.get_one::<String>("target") {
            config.target_column = Some(target.clone());
        }

        if let Some(min_r2) = matches.get_one::<f64>("min_r2") {
            config.trainer.min_r2 = *min_r2;
        }

        if let Some(cv) = matches.get_one::<usize>("cv") {
            config.trainer.cv_folds = *cv;
        }

        if let Some(models) = matches.get_one::<String>("models") {
            config
                .trainer
                .retain_families(&split_list(models))
                .map_err(anyhow::Error::msg)?;
        }

        if matches.get_flag("no_report") {
            config.html_report = None;
        }

        Ok(config)
    }
}
