//! CLI binary smoke tests using assert_cmd.
//!
//! These tests drive the compiled `tabreg` binary end-to-end: argument
//! parsing, a full train run on small temp tables, and prediction.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("tabreg").unwrap()
}

fn write_split(path: &Path, rows: std::ops::Range<usize>) {
    let mut content = String::from("a,b,y\n");
    for i in rows {
        let a = i as f64 * 0.5;
        let b = ((i * 37) % 11) as f64;
        let y = 2.0 * a + 3.0 * b + 1.0 + 0.01 * (i as f64).sin();
        content.push_str(&format!("{},{},{}\n", a, b, y));
    }
    std::fs::write(path, content).unwrap();
}

fn splits(dir: &Path) -> (String, String) {
    let train = dir.join("train.csv");
    let test = dir.join("test.csv");
    write_split(&train, 0..60);
    write_split(&test, 60..80);
    (
        train.to_str().unwrap().to_string(),
        test.to_str().unwrap().to_string(),
    )
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("predict"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tabreg"));
}

#[test]
fn models_lists_default_registry() {
    cmd()
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("Random Forest"))
        .stdout(predicate::str::contains("K-Neighbours Regressor"))
        .stdout(predicate::str::contains("n_neighbors=7"));
}

// ---------------------------------------------------------------------------
// train / predict
// ---------------------------------------------------------------------------

#[test]
fn train_without_data_errors() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .arg("train")
        .assert()
        .failure();
}

#[test]
fn train_rejects_unknown_model_family() {
    let dir = tempfile::tempdir().unwrap();
    let (train, test) = splits(dir.path());
    cmd()
        .current_dir(dir.path())
        .args(["train", "-r", &train, "-t", &test, "--models", "catboost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown model type"));
}

#[test]
fn train_then_predict_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (train, test) = splits(dir.path());
    let model = dir.path().join("out").join("model.json");

    cmd()
        .current_dir(dir.path())
        .args(["train", "-r", &train, "-t", &test, "--models", "linear,knn"])
        .args(["-o", model.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Best model: Linear Regressor"));

    assert!(model.exists());
    assert!(dir.path().join("artifacts").join("model_report.json").exists());
    assert!(dir.path().join("artifacts").join("model_report.html").exists());

    let predictions = dir.path().join("predictions.csv");
    cmd()
        .current_dir(dir.path())
        .args(["predict", &test, "-m", model.to_str().unwrap()])
        .args(["-o", predictions.to_str().unwrap()])
        .assert()
        .success();

    let content = std::fs::read_to_string(&predictions).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "prediction");
    assert_eq!(lines.len(), 21);
}

#[test]
fn train_below_threshold_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (train, test) = splits(dir.path());
    let model = dir.path().join("model.json");

    cmd()
        .current_dir(dir.path())
        .args(["train", "-r", &train, "-t", &test, "--models", "linear"])
        .args(["--min-r2", "1.5", "--no-report"])
        .args(["-o", model.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No best model found"));

    assert!(!model.exists());
}

#[test]
fn predict_missing_model_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (_, test) = splits(dir.path());
    cmd()
        .current_dir(dir.path())
        .args(["predict", &test, "-m", "/nonexistent/model.json"])
        .assert()
        .failure();
}
