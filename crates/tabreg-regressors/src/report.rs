//! Model report: per-model scores, JSON persistence and an HTML summary.
use std::path::Path;

use anyhow::{Context, Result};
use maud::{html, PreEscaped, DOCTYPE};
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot};
use serde::{Deserialize, Serialize};

use crate::config::ModelType;

/// Scores of one registry entry after search and refit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelScore {
    pub name: String,
    pub best_params: ModelType,
    /// Mean cross-validated R² of `best_params`; `None` if CV was skipped.
    pub cv_score: Option<f64>,
    pub test_r2: f64,
    pub test_mae: f64,
    pub test_rmse: f64,
}

/// Mapping from model name to its held-out score, in registry order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelReport {
    pub entries: Vec<ModelScore>,
}

impl ModelReport {
    pub fn push(&mut self, score: ModelScore) {
        self.entries.push(score);
    }

    /// Test R² of `name`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.test_r2)
    }

    /// Entry with the highest test R². Ties keep the earliest entry and NaN
    /// scores never win.
    pub fn best(&self) -> Option<&ModelScore> {
        let mut best: Option<&ModelScore> = None;
        for entry in self.entries.iter().filter(|e| !e.test_r2.is_nan()) {
            match best {
                Some(b) if entry.test_r2 <= b.test_r2 => {}
                _ => best = Some(entry),
            }
        }
        best
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        ensure_parent(path)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse report: {}", path.display()))
    }
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Bar chart of test R² per model
pub fn plot_test_scores(report: &ModelReport, title: &str) -> Plot {
    let names: Vec<String> = report.entries.iter().map(|e| e.name.clone()).collect();
    let scores: Vec<f64> = report.entries.iter().map(|e| e.test_r2).collect();

    let trace = Bar::new(names, scores).name("Test R²");

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Model"))
        .y_axis(Axis::new().title("R²"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Render the report as a standalone HTML page.
pub fn render_html(report: &ModelReport, best_model: Option<&str>) -> String {
    let plot = plot_test_scores(report, "Held-out R² by model");
    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "tabreg model report" }
                script src="https://cdn.plot.ly/plotly-2.12.1.min.js" {}
            }
            body {
                h1 { "Model report" }
                @if let Some(best) = best_model {
                    p { "Selected model: " strong { (best) } }
                }
                table {
                    thead {
                        tr {
                            th { "Model" }
                            th { "Best parameters" }
                            th { "CV R²" }
                            th { "Test R²" }
                            th { "Test MAE" }
                            th { "Test RMSE" }
                        }
                    }
                    tbody {
                        @for entry in &report.entries {
                            tr {
                                td { (entry.name) }
                                td { (entry.best_params) }
                                td {
                                    @match entry.cv_score {
                                        Some(s) => { (format!("{:.4}", s)) }
                                        None => { "-" }
                                    }
                                }
                                td { (format!("{:.4}", entry.test_r2)) }
                                td { (format!("{:.4}", entry.test_mae)) }
                                td { (format!("{:.4}", entry.test_rmse)) }
                            }
                        }
                    }
                }
                div { (PreEscaped(plot.to_inline_html(Some("test-scores")))) }
            }
        }
    };
    markup.into_string()
}

pub fn write_html_report<P: AsRef<Path>>(
    report: &ModelReport,
    best_model: Option<&str>,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    std::fs::write(path, render_html(report, best_model))
        .with_context(|| format!("Failed to write HTML report: {}", path.display()))
}
