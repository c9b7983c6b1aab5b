use tabreg_regressors::config::{ModelType, SearchSpace};
use tabreg_regressors::math::Array2;
use tabreg_regressors::models::factory;

fn tiny_dataset() -> (Array2<f64>, Vec<f64>) {
    // y = x0 + 2 * x1
    let x = Array2::from_shape_vec(
        (8, 2),
        vec![
            1.0, 0.0, //
            0.0, 1.0, //
            1.0, 1.0, //
            2.0, 0.5, //
            0.5, 2.0, //
            3.0, 1.0, //
            1.5, 2.5, //
            2.5, 3.0,
        ],
    )
    .expect("failed to create feature matrix");
    let y = (0..x.nrows())
        .map(|r| x.row_slice(r)[0] + 2.0 * x.row_slice(r)[1])
        .collect();
    (x, y)
}

#[test]
fn test_factory_builds_and_predicts_every_family() {
    let (x, y) = tiny_dataset();
    let families = [
        SearchSpace::RandomForest {
            n_estimators: vec![10],
            max_depth: vec![],
        },
        SearchSpace::DecisionTree {
            max_depth: vec![],
            min_samples_split: vec![],
        },
        SearchSpace::GradientBoosting {
            n_estimators: vec![10],
            learning_rate: vec![],
            max_depth: vec![],
        },
        SearchSpace::LinearRegression {
            fit_intercept: vec![],
        },
        SearchSpace::KNeighbors {
            n_neighbors: vec![3],
        },
    ];

    for space in families {
        let params = space.candidates().remove(0);
        let mut model = factory::build_model(&params);
        assert_eq!(model.name(), params.family());
        model.fit(&x, &y).unwrap();
        let predictions = model.predict(&x).unwrap();
        assert_eq!(predictions.len(), x.nrows(), "{}", params.family());
    }
}

#[test]
fn test_restore_rejects_mismatched_family() {
    let (x, y) = tiny_dataset();
    let mut model = factory::build_model(&ModelType::KNeighbors { n_neighbors: 2 });
    model.fit(&x, &y).unwrap();
    let fitted = model.take_fitted().unwrap();

    let linear = ModelType::LinearRegression {
        fit_intercept: true,
    };
    assert!(factory::restore_model(&linear, fitted).is_err());
}
