use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A concrete estimator family together with one set of hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    RandomForest {
        n_estimators: usize,
        max_depth: Option<u16>,
    },
    DecisionTree {
        max_depth: Option<u16>,
        min_samples_split: usize,
    },
    GradientBoosting {
        n_estimators: usize,
        learning_rate: f32,
        max_depth: u32,
    },
    LinearRegression {
        fit_intercept: bool,
    },
    KNeighbors {
        n_neighbors: usize,
    },
    #[cfg(feature = "xgboost")]
    XGBoost {
        n_estimators: u32,
        learning_rate: f32,
        max_depth: u32,
    },
}

impl ModelType {
    /// Short family identifier, shared with `SearchSpace::family`.
    pub fn family(&self) -> &'static str {
        match self {
            ModelType::RandomForest { .. } => "random_forest",
            ModelType::DecisionTree { .. } => "decision_tree",
            ModelType::GradientBoosting { .. } => "gradient_boosting",
            ModelType::LinearRegression { .. } => "linear_regression",
            ModelType::KNeighbors { .. } => "k_neighbors",
            #[cfg(feature = "xgboost")]
            ModelType::XGBoost { .. } => "xgboost",
        }
    }
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::RandomForest {
            n_estimators: 100,
            max_depth: None,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::RandomForest {
                n_estimators,
                max_depth,
            } => write!(
                f,
                "n_estimators={}, max_depth={}",
                n_estimators,
                depth_label(*max_depth)
            ),
            ModelType::DecisionTree {
                max_depth,
                min_samples_split,
            } => write!(
                f,
                "max_depth={}, min_samples_split={}",
                depth_label(*max_depth),
                min_samples_split
            ),
            ModelType::GradientBoosting {
                n_estimators,
                learning_rate,
                max_depth,
            } => write!(
                f,
                "n_estimators={}, learning_rate={}, max_depth={}",
                n_estimators, learning_rate, max_depth
            ),
            ModelType::LinearRegression { fit_intercept } => {
                write!(f, "fit_intercept={}", fit_intercept)
            }
            ModelType::KNeighbors { n_neighbors } => write!(f, "n_neighbors={}", n_neighbors),
            #[cfg(feature = "xgboost")]
            ModelType::XGBoost {
                n_estimators,
                learning_rate,
                max_depth,
            } => write!(
                f,
                "n_estimators={}, learning_rate={}, max_depth={}",
                n_estimators, learning_rate, max_depth
            ),
        }
    }
}

fn depth_label(depth: Option<u16>) -> String {
    depth.map_or_else(|| "none".to_string(), |d| d.to_string())
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "random_forest" | "rf" => Ok(ModelType::default()),
            "decision_tree" | "tree" => Ok(ModelType::DecisionTree {
                max_depth: None,
                min_samples_split: 2,
            }),
            "gradient_boosting" | "gbdt" => Ok(ModelType::GradientBoosting {
                n_estimators: 100,
                learning_rate: 0.1,
                max_depth: 3,
            }),
            "linear_regression" | "linear" => Ok(ModelType::LinearRegression {
                fit_intercept: true,
            }),
            "k_neighbors" | "knn" => Ok(ModelType::KNeighbors { n_neighbors: 5 }),
            #[cfg(feature = "xgboost")]
            "xgboost" | "xgb" => Ok(ModelType::XGBoost {
                n_estimators: 100,
                learning_rate: 0.3,
                max_depth: 6,
            }),
            _ => Err(format!(
                "Unknown model type: {}. To use xgboost, please compile with `--features xgboost`",
                s
            )),
        }
    }
}

/// Hyper-parameter grid for one estimator family.
///
/// Every field lists the values to try; an empty list means "use the
/// family default". `candidates` expands the cartesian product.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum SearchSpace {
    RandomForest {
        #[serde(default)]
        n_estimators: Vec<usize>,
        #[serde(default)]
        max_depth: Vec<Option<u16>>,
    },
    DecisionTree {
        #[serde(default)]
        max_depth: Vec<Option<u16>>,
        #[serde(default)]
        min_samples_split: Vec<usize>,
    },
    GradientBoosting {
        #[serde(default)]
        n_estimators: Vec<usize>,
        #[serde(default)]
        learning_rate: Vec<f32>,
        #[serde(default)]
        max_depth: Vec<u32>,
    },
    LinearRegression {
        #[serde(default)]
        fit_intercept: Vec<bool>,
    },
    KNeighbors {
        #[serde(default)]
        n_neighbors: Vec<usize>,
    },
    #[cfg(feature = "xgboost")]
    XGBoost {
        #[serde(default)]
        n_estimators: Vec<u32>,
        #[serde(default)]
        learning_rate: Vec<f32>,
        #[serde(default)]
        max_depth: Vec<u32>,
    },
}

fn or_default<T: Clone>(values: &[T], default: T) -> Vec<T> {
    if values.is_empty() {
        vec![default]
    } else {
        values.to_vec()
    }
}

impl SearchSpace {
    pub fn family(&self) -> &'static str {
        match self {
            SearchSpace::RandomForest { .. } => "random_forest",
            SearchSpace::DecisionTree { .. } => "decision_tree",
            SearchSpace::GradientBoosting { .. } => "gradient_boosting",
            SearchSpace::LinearRegression { .. } => "linear_regression",
            SearchSpace::KNeighbors { .. } => "k_neighbors",
            #[cfg(feature = "xgboost")]
            SearchSpace::XGBoost { .. } => "xgboost",
        }
    }

    /// Expand the grid into concrete parameter sets, first field outermost.
    pub fn candidates(&self) -> Vec<ModelType> {
        match self {
            SearchSpace::RandomForest {
                n_estimators,
                max_depth,
            } => {
                let depths = or_default(max_depth, None);
                or_default(n_estimators, 100)
                    .into_iter()
                    .flat_map(|n| {
                        depths.iter().map(move |&d| ModelType::RandomForest {
                            n_estimators: n,
                            max_depth: d,
                        })
                    })
                    .collect()
            }
            SearchSpace::DecisionTree {
                max_depth,
                min_samples_split,
            } => {
                let splits = or_default(min_samples_split, 2);
                or_default(max_depth, None)
                    .into_iter()
                    .flat_map(|d| {
                        splits.iter().map(move |&s| ModelType::DecisionTree {
                            max_depth: d,
                            min_samples_split: s,
                        })
                    })
                    .collect()
            }
            SearchSpace::GradientBoosting {
                n_estimators,
                learning_rate,
                max_depth,
            } => {
                let rates = or_default(learning_rate, 0.1);
                let depths = or_default(max_depth, 3);
                let mut out = Vec::new();
                for n in or_default(n_estimators, 100) {
                    for &lr in &rates {
                        for &d in &depths {
                            out.push(ModelType::GradientBoosting {
                                n_estimators: n,
                                learning_rate: lr,
                                max_depth: d,
                            });
                        }
                    }
                }
                out
            }
            SearchSpace::LinearRegression { fit_intercept } => or_default(fit_intercept, true)
                .into_iter()
                .map(|fit_intercept| ModelType::LinearRegression { fit_intercept })
                .collect(),
            SearchSpace::KNeighbors { n_neighbors } => or_default(n_neighbors, 5)
                .into_iter()
                .map(|n_neighbors| ModelType::KNeighbors { n_neighbors })
                .collect(),
            #[cfg(feature = "xgboost")]
            SearchSpace::XGBoost {
                n_estimators,
                learning_rate,
                max_depth,
            } => {
                let rates = or_default(learning_rate, 0.3);
                let depths = or_default(max_depth, 6);
                let mut out = Vec::new();
                for n in or_default(n_estimators, 100) {
                    for &lr in &rates {
                        for &d in &depths {
                            out.push(ModelType::XGBoost {
                                n_estimators: n,
                                learning_rate: lr,
                                max_depth: d,
                            });
                        }
                    }
                }
                out
            }
        }
    }
}

/// A named entry of the model registry.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelCandidate {
    pub name: String,
    pub search: SearchSpace,
}

impl ModelCandidate {
    pub fn new(name: impl Into<String>, search: SearchSpace) -> Self {
        Self {
            name: name.into(),
            search,
        }
    }
}

/// The default registry: every family with a small grid.
pub fn default_candidates() -> Vec<ModelCandidate> {
    let candidates = vec![
        ModelCandidate::new(
            "Random Forest",
            SearchSpace::RandomForest {
                n_estimators: vec![50, 100],
                max_depth: vec![],
            },
        ),
        ModelCandidate::new(
            "Decision Tree",
            SearchSpace::DecisionTree {
                max_depth: vec![None, Some(5), Some(10), Some(20)],
                min_samples_split: vec![],
            },
        ),
        ModelCandidate::new(
            "Gradient Boosting",
            SearchSpace::GradientBoosting {
                n_estimators: vec![50, 100],
                learning_rate: vec![0.01, 0.1],
                max_depth: vec![],
            },
        ),
        ModelCandidate::new(
            "Linear Regressor",
            SearchSpace::LinearRegression {
                fit_intercept: vec![],
            },
        ),
        ModelCandidate::new(
            "K-Neighbours Regressor",
            SearchSpace::KNeighbors {
                n_neighbors: vec![3, 5, 7],
            },
        ),
    ];

    #[cfg(feature = "xgboost")]
    let candidates = {
        let mut candidates = candidates;
        candidates.push(ModelCandidate::new(
            "XG-Boost Regressor",
            SearchSpace::XGBoost {
                n_estimators: vec![50, 100],
                learning_rate: vec![0.01, 0.1],
                max_depth: vec![],
            },
        ));
        candidates
    };

    candidates
}

/// Settings for a model selection run.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    /// Where the winning model is written.
    pub trained_model_file_path: PathBuf,
    /// Where the per-model score report is written, if anywhere.
    pub report_file_path: Option<PathBuf>,
    /// Minimum held-out R² the best model must reach.
    pub min_r2: f64,
    pub cv_folds: usize,
    pub shuffle_folds: bool,
    pub seed: Option<u64>,
    /// Score grid candidates on the rayon pool.
    pub parallel: bool,
    pub candidates: Vec<ModelCandidate>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            trained_model_file_path: PathBuf::from("artifacts").join("model.json"),
            report_file_path: Some(PathBuf::from("artifacts").join("model_report.json")),
            min_r2: 0.6,
            cv_folds: 3,
            shuffle_folds: false,
            seed: None,
            parallel: true,
            candidates: default_candidates(),
        }
    }
}

impl TrainerConfig {
    /// Keep only the candidates whose family matches one of `names`.
    pub fn retain_families(&mut self, names: &[String]) -> Result<(), String> {
        let families = names
            .iter()
            .map(|n| ModelType::from_str(n).map(|m| m.family()))
            .collect::<Result<Vec<_>, _>>()?;
        self.candidates
            .retain(|c| families.contains(&c.search.family()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_boosting_grid_expands_cartesian_product() {
        let space = SearchSpace::GradientBoosting {
            n_estimators: vec![50, 100],
            learning_rate: vec![0.01, 0.1],
            max_depth: vec![],
        };
        let candidates = space.candidates();
        assert_eq!(candidates.len(), 4);
        assert_eq!(
            candidates[0],
            ModelType::GradientBoosting {
                n_estimators: 50,
                learning_rate: 0.01,
                max_depth: 3
            }
        );
        assert_eq!(
            candidates[3],
            ModelType::GradientBoosting {
                n_estimators: 100,
                learning_rate: 0.1,
                max_depth: 3
            }
        );
    }

    #[test]
    fn empty_grid_uses_defaults() {
        let space = SearchSpace::LinearRegression {
            fit_intercept: vec![],
        };
        assert_eq!(
            space.candidates(),
            vec![ModelType::LinearRegression {
                fit_intercept: true
            }]
        );
    }

    #[test]
    fn default_registry_names_are_unique() {
        let candidates = default_candidates();
        let mut names: Vec<_> = candidates.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), candidates.len());
        assert_eq!(candidates[0].name, "Random Forest");
    }

    #[test]
    fn model_type_from_str_aliases() {
        assert_eq!(ModelType::from_str("rf").unwrap().family(), "random_forest");
        assert_eq!(ModelType::from_str("KNN").unwrap().family(), "k_neighbors");
        assert_eq!(
            ModelType::from_str("gradient-boosting").unwrap().family(),
            "gradient_boosting"
        );
        assert!(ModelType::from_str("catboost").is_err());
    }

    #[test]
    fn retain_families_filters_registry() {
        let mut config = TrainerConfig::default();
        config
            .retain_families(&["linear".to_string(), "knn".to_string()])
            .unwrap();
        let names: Vec<_> = config.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Linear Regressor", "K-Neighbours Regressor"]);
    }

    #[test]
    fn trainer_config_fills_missing_fields() {
        let config: TrainerConfig = serde_json::from_str(r#"{"min_r2": 0.8}"#).unwrap();
        assert_eq!(config.min_r2, 0.8);
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.candidates.len(), default_candidates().len());
    }

    #[test]
    fn search_space_json_allows_missing_fields() {
        let space: SearchSpace =
            serde_json::from_str(r#"{"KNeighbors": {}}"#).unwrap();
        assert_eq!(space.candidates(), vec![ModelType::KNeighbors { n_neighbors: 5 }]);
    }
}
