use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use tabreg_cli::predict::run_prediction;
use tabreg_cli::train::input::TrainRunConfig;
use tabreg_cli::train::trainer;
use tabreg_regressors::config::default_candidates;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("TABREG_LOG", "error,tabreg=info"))
        .init();

    let matches = Command::new("tabreg")
        .version(clap::crate_version!())
        .about("Select, tune and persist the best regressor for a tabular dataset")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Search every candidate model and persist the best one")
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON training configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("train_data")
                        .short('r')
                        .long("train_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the training split (*.csv or *.tsv). Overrides the \
                             training data file specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("test_data")
                        .short('t')
                        .long("test_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the test split (*.csv or *.tsv). Overrides the \
                             test data file specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("File path that the selected model will be written to.")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Name of the target column. Defaults to the last column."),
                )
                .arg(
                    Arg::new("min_r2")
                        .long("min-r2")
                        .value_parser(clap::value_parser!(f64))
                        .help("Minimum held-out R² the selected model must reach."),
                )
                .arg(
                    Arg::new("cv")
                        .long("cv")
                        .value_parser(clap::value_parser!(usize))
                        .help("Number of cross-validation folds for the grid search."),
                )
                .arg(
                    Arg::new("models")
                        .short('m')
                        .long("models")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Comma separated model families to consider, e.g. 'rf,linear,knn'.")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Disable HTML report generation.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict with a previously selected model")
                .arg(
                    Arg::new("data")
                        .help("Path to the feature table (*.csv or *.tsv)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the persisted model file")
                        .default_value("artifacts/model.json")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write predictions (*.csv or *.tsv). Defaults to stdout.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("models").about("List the default candidate models and grids"))
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("models", _)) => handle_models(),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[tabreg::train] Training from config: {:?}", path),
        None => log::info!("[tabreg::train] No config provided; using defaults."),
    }

    let params = TrainRunConfig::from_arguments(config_path, matches)?;

    match trainer::run_training(&params) {
        Ok(outcome) => {
            println!(
                "Best model: {} [{}] test R² {:.4}",
                outcome.best_model_name, outcome.best_params, outcome.test_r2
            );
            println!("Saved to: {}", outcome.model_path.display());
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let data_path: &PathBuf = matches
        .get_one("data")
        .ok_or_else(|| anyhow!("Missing input data path"))?;
    let model_path: &PathBuf = matches
        .get_one("model_path")
        .ok_or_else(|| anyhow!("Missing model path"))?;
    let output_path = matches.get_one::<PathBuf>("output_file");

    match run_prediction(model_path, data_path, output_path.map(PathBuf::as_path)) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Prediction failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_models() -> Result<()> {
    for candidate in default_candidates() {
        let grid = candidate.search.candidates();
        println!(
            "{} ({}): {} parameter set(s)",
            candidate.name,
            candidate.search.family(),
            grid.len()
        );
        for params in grid {
            println!("    {}", params);
        }
    }
    Ok(())
}
