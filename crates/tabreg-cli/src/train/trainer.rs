use anyhow::{Context, Result};

use tabreg_regressors::io::read_numeric_table;
use tabreg_regressors::report::write_html_report;
use tabreg_regressors::trainer::{ModelTrainer, TrainingOutcome};

use super::input::TrainRunConfig;

pub fn run_training(config: &TrainRunConfig) -> Result<TrainingOutcome> {
    let target = config.target_column.as_deref();

    let train = read_numeric_table(&config.train_data, target)
        .context("Failed to load training data")?;
    log::info!(
        "Loaded {} training rows with {} features",
        train.n_samples(),
        train.n_features()
    );

    let test = read_numeric_table(&config.test_data, target).context("Failed to load test data")?;
    log::info!("Loaded {} test rows", test.n_samples());

    let start_time = std::time::Instant::now();
    let outcome = ModelTrainer::new(config.trainer.clone()).initiate_model_trainer(&train, &test)?;
    log::info!("Model selection completed in {:?}", start_time.elapsed());

    if let Some(html_path) = &config.html_report {
        write_html_report(&outcome.report, Some(&outcome.best_model_name), html_path)?;
        log::info!("HTML report saved to: {}", html_path);
    }

    Ok(outcome)
}
