//! K-fold grid search over a `SearchSpace`.
//!
//! Each expanded parameter set is fitted on every training fold and scored
//! with R² on the held-out fold; the mean over folds ranks the parameter sets.
//! Ties keep the earliest set in grid order.

use anyhow::{bail, ensure, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::{ModelType, SearchSpace};
use crate::data_handling::Dataset;
use crate::metrics::r2_score;
use crate::models::factory::build_model;

/// A single train/validation split of row indices.
#[derive(Debug, Clone)]
pub struct FoldSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// K-fold splitter. Unshuffled by default: folds are contiguous blocks, the
/// first `n_samples % n_splits` folds one row larger.
#[derive(Debug, Clone)]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            seed: None,
        }
    }

    /// Shuffle rows before folding; `None` draws a seed from entropy.
    pub fn with_shuffle(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        ensure!(
            self.n_splits >= 2,
            "n_splits must be at least 2, got {}",
            self.n_splits
        );
        ensure!(
            n_samples >= self.n_splits,
            "n_samples ({}) must be >= n_splits ({})",
            n_samples,
            self.n_splits
        );

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            indices.shuffle(&mut rng);
        }

        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut splits = Vec::with_capacity(self.n_splits);
        let mut current = 0;
        for fold_idx in 0..self.n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let test_indices = indices[current..current + fold_size].to_vec();
            let train_indices = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();
            splits.push(FoldSplit {
                train_indices,
                test_indices,
                fold_idx,
            });
            current += fold_size;
        }
        Ok(splits)
    }
}

/// Cross-validation result of one parameter set.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub params: ModelType,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best_params: ModelType,
    /// `None` when the grid held a single parameter set and CV was skipped.
    pub best_cv_score: Option<f64>,
    pub scores: Vec<CandidateScore>,
}

/// R² of `params` on each validation fold.
pub fn cross_val_score(params: &ModelType, train: &Dataset, splits: &[FoldSplit]) -> Result<Vec<f64>> {
    splits
        .iter()
        .map(|split| {
            let fold_train = train.subset(&split.train_indices);
            let fold_valid = train.subset(&split.test_indices);

            let mut model = build_model(params);
            model.fit(&fold_train.x, fold_train.y.as_slice())?;
            let predicted = model.predict(&fold_valid.x)?;
            r2_score(fold_valid.y.as_slice(), &predicted)
        })
        .collect()
}

/// Highest mean CV score; ties keep the earliest entry and NaN never wins.
pub fn best_candidate(scores: &[CandidateScore]) -> Option<&CandidateScore> {
    let mut best: Option<&CandidateScore> = None;
    for score in scores.iter().filter(|s| !s.mean_score.is_nan()) {
        match best {
            Some(b) if score.mean_score <= b.mean_score => {}
            _ => best = Some(score),
        }
    }
    best
}

/// Pick the best parameter set of `space` by mean cross-validated R².
pub fn grid_search(
    space: &SearchSpace,
    train: &Dataset,
    kfold: &KFold,
    parallel: bool,
) -> Result<SearchOutcome> {
    let candidates = space.candidates();
    ensure!(!candidates.is_empty(), "Empty search space for {}", space.family());

    if candidates.len() == 1 {
        log::debug!("{}: single parameter set, skipping CV", space.family());
        return Ok(SearchOutcome {
            best_params: candidates[0].clone(),
            best_cv_score: None,
            scores: Vec::new(),
        });
    }

    let splits = kfold.split(train.n_samples())?;
    log::debug!(
        "{}: evaluating {} parameter sets on {} folds",
        space.family(),
        candidates.len(),
        splits.len()
    );

    let evaluate = |params: &ModelType| -> Option<CandidateScore> {
        match cross_val_score(params, train, &splits) {
            Ok(fold_scores) => {
                let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
                log::trace!("{} [{}] mean CV R² {:.4}", space.family(), params, mean_score);
                Some(CandidateScore {
                    params: params.clone(),
                    fold_scores,
                    mean_score,
                })
            }
            Err(e) => {
                log::warn!("Skipping {} [{}]: {:#}", space.family(), params, e);
                None
            }
        }
    };

    let results: Vec<Option<CandidateScore>> = if parallel {
        candidates.par_iter().map(|p| evaluate(p)).collect()
    } else {
        candidates.iter().map(|p| evaluate(p)).collect()
    };
    let scores: Vec<CandidateScore> = results.into_iter().flatten().collect();

    let Some(best) = best_candidate(&scores) else {
        bail!(
            "No parameter set of {} could be cross-validated",
            space.family()
        );
    };

    let best_params = best.params.clone();
    let best_cv_score = Some(best.mean_score);
    Ok(SearchOutcome {
        best_params,
        best_cv_score,
        scores,
    })
}
