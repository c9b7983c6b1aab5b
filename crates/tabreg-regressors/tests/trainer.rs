//! End-to-end model selection on synthetic regression data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tabreg_regressors::config::{default_candidates, ModelCandidate, SearchSpace, TrainerConfig};
use tabreg_regressors::data_handling::Dataset;
use tabreg_regressors::error::TrainerError;
use tabreg_regressors::math::{Array1, Array2};
use tabreg_regressors::metrics::r2_score;
use tabreg_regressors::persist::{load_model, predict_with_saved_model};
use tabreg_regressors::report::ModelReport;
use tabreg_regressors::search::KFold;
use tabreg_regressors::trainer::{evaluate_models, ModelTrainer};

// y = 3 * x0 - 2 * x1 + 0.5 * x2 + 1 + small noise
fn synthetic(n: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for _ in 0..n {
        let row: Vec<f64> = (0..3).map(|_| rng.gen_range(-5.0..5.0)).collect();
        let noise: f64 = rng.gen_range(-0.05..0.05);
        y.push(3.0 * row[0] - 2.0 * row[1] + 0.5 * row[2] + 1.0 + noise);
        rows.push(row);
    }
    Dataset::new(
        Array2::from_rows(rows).unwrap(),
        Array1::from_vec(y),
        vec!["a".into(), "b".into(), "c".into()],
    )
    .unwrap()
}

fn config_in(dir: &tempfile::TempDir) -> TrainerConfig {
    TrainerConfig {
        trained_model_file_path: dir.path().join("artifacts").join("model.json"),
        report_file_path: Some(dir.path().join("artifacts").join("model_report.json")),
        ..TrainerConfig::default()
    }
}

#[test]
fn selects_and_persists_the_best_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let train = synthetic(60, 1);
    let test = synthetic(30, 2);

    let outcome = ModelTrainer::new(config.clone())
        .initiate_model_trainer(&train, &test)
        .unwrap();

    assert!(outcome.test_r2 > 0.9, "test R² {}", outcome.test_r2);
    assert_eq!(outcome.report.entries.len(), default_candidates().len());
    assert_eq!(outcome.report.best().unwrap().name, outcome.best_model_name);

    // The persisted model reproduces the reported score
    assert!(config.trained_model_file_path.exists());
    let predicted = predict_with_saved_model(&config.trained_model_file_path, &test.x).unwrap();
    let reloaded_r2 = r2_score(test.y.as_slice(), &predicted).unwrap();
    assert!((reloaded_r2 - outcome.test_r2).abs() < 1e-6);

    let persisted = load_model(&config.trained_model_file_path).unwrap();
    assert_eq!(persisted.name, outcome.best_model_name);
    assert_eq!(persisted.test_r2, outcome.test_r2);
    assert_eq!(persisted.feature_names, vec!["a", "b", "c"]);

    let report = ModelReport::read_json(config.report_file_path.as_ref().unwrap()).unwrap();
    assert_eq!(report, outcome.report);
}

#[test]
fn best_score_below_threshold_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainerConfig {
        min_r2: 1.5,
        candidates: vec![ModelCandidate::new(
            "Linear Regressor",
            SearchSpace::LinearRegression {
                fit_intercept: vec![],
            },
        )],
        ..config_in(&dir)
    };

    let err = ModelTrainer::new(config.clone())
        .initiate_model_trainer(&synthetic(40, 3), &synthetic(20, 4))
        .unwrap_err();

    match err.downcast_ref::<TrainerError>() {
        Some(TrainerError::NoBestModel {
            best_model,
            threshold,
            ..
        }) => {
            assert_eq!(best_model, "Linear Regressor");
            assert_eq!(*threshold, 1.5);
        }
        other => panic!("unexpected error: {:?} ({:#})", other, err),
    }
    assert!(!config.trained_model_file_path.exists());
}

#[test]
fn mismatched_feature_counts_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let train = synthetic(30, 5);
    let narrow = Dataset::new(
        train.x.select_columns(..2),
        train.y.clone(),
        vec![],
    )
    .unwrap();

    let err = ModelTrainer::new(config_in(&dir))
        .initiate_model_trainer(&train, &narrow)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrainerError>(),
        Some(TrainerError::FeatureMismatch {
            expected: 3,
            found: 2
        })
    ));
}

#[test]
fn duplicate_candidate_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let knn = SearchSpace::KNeighbors {
        n_neighbors: vec![3],
    };
    let config = TrainerConfig {
        candidates: vec![
            ModelCandidate::new("knn", knn.clone()),
            ModelCandidate::new("knn", knn),
        ],
        ..config_in(&dir)
    };
    assert!(ModelTrainer::new(config)
        .initiate_model_trainer(&synthetic(30, 6), &synthetic(10, 7))
        .is_err());
}

#[test]
fn report_follows_candidate_order_and_skips_failures() {
    let train = synthetic(30, 8);
    let test = synthetic(10, 9);
    let candidates = vec![
        ModelCandidate::new(
            "K-Neighbours Regressor",
            SearchSpace::KNeighbors {
                n_neighbors: vec![3, 5],
            },
        ),
        // 30 training rows cannot feed 100 neighbours
        ModelCandidate::new(
            "Impossible",
            SearchSpace::KNeighbors {
                n_neighbors: vec![100],
            },
        ),
        ModelCandidate::new(
            "Linear Regressor",
            SearchSpace::LinearRegression {
                fit_intercept: vec![],
            },
        ),
    ];

    let evaluation = evaluate_models(&train, &test, &candidates, &KFold::new(3), false).unwrap();
    let names: Vec<_> = evaluation
        .report
        .entries
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["K-Neighbours Regressor", "Linear Regressor"]);
    assert_eq!(evaluation.models.len(), 2);
    assert!(evaluation.report.entries[0].cv_score.is_some());
    assert!(evaluation.report.entries[1].cv_score.is_none());
    assert!(evaluation.report.get("Linear Regressor").unwrap() > 0.99);
}

#[test]
fn unusable_fold_count_fails_before_training() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainerConfig {
        cv_folds: 1,
        ..config_in(&dir)
    };
    let err = ModelTrainer::new(config.clone())
        .initiate_model_trainer(&synthetic(40, 10), &synthetic(10, 11))
        .unwrap_err();
    assert!(format!("{:#}", err).contains("n_splits must be at least 2"), "{:#}", err);
    assert!(!config.trained_model_file_path.exists());

    // Default 3 folds cannot split 2 training rows
    let config = config_in(&dir);
    let err = ModelTrainer::new(config.clone())
        .initiate_model_trainer(&synthetic(2, 12), &synthetic(10, 13))
        .unwrap_err();
    assert!(format!("{:#}", err).contains("must be >= n_splits"), "{:#}", err);
    assert!(!config.trained_model_file_path.exists());
}

#[test]
fn every_candidate_failing_is_an_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainerConfig {
        candidates: vec![ModelCandidate::new(
            "Impossible",
            SearchSpace::KNeighbors {
                n_neighbors: vec![100],
            },
        )],
        ..config_in(&dir)
    };
    let err = ModelTrainer::new(config.clone())
        .initiate_model_trainer(&synthetic(30, 14), &synthetic(10, 15))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrainerError>(),
        Some(TrainerError::EmptyReport)
    ));
    assert!(!config.trained_model_file_path.exists());
}

#[test]
fn seeded_shuffle_flows_from_config_into_the_folds() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainerConfig {
        cv_folds: 4,
        shuffle_folds: true,
        seed: Some(11),
        min_r2: f64::MIN,
        candidates: vec![ModelCandidate::new(
            "K-Neighbours Regressor",
            SearchSpace::KNeighbors {
                n_neighbors: vec![3, 5],
            },
        )],
        ..config_in(&dir)
    };
    let trainer = ModelTrainer::new(config);

    let kfold = trainer.kfold();
    assert_eq!(kfold.n_splits, 4);
    assert!(kfold.shuffle);
    assert_eq!(kfold.seed, Some(11));

    let folds = kfold.split(40).unwrap();
    let expected = KFold::new(4).with_shuffle(Some(11)).split(40).unwrap();
    let contiguous = KFold::new(4).split(40).unwrap();
    assert_eq!(folds[0].test_indices, expected[0].test_indices);
    assert_ne!(folds[0].test_indices, contiguous[0].test_indices);

    let train = synthetic(40, 16);
    let test = synthetic(10, 17);
    let first = trainer.initiate_model_trainer(&train, &test).unwrap();
    let second = trainer.initiate_model_trainer(&train, &test).unwrap();
    assert!(first.report.entries[0].cv_score.is_some());
    assert_eq!(first.report.entries[0].cv_score, second.report.entries[0].cv_score);
}
