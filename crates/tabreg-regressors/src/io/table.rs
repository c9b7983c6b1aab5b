//! Delimited numeric table reader.
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::data_handling::{split_features_target, Dataset};
use crate::math::Array2;

/// A header row plus a dense numeric body.
#[derive(Debug, Clone)]
pub struct NumericTable {
    pub headers: Vec<String>,
    pub values: Array2<f64>,
}

fn delimiter_for(path: &Path) -> u8 {
    let is_tsv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tsv"))
        .unwrap_or(false);
    if is_tsv {
        b'\t'
    } else {
        b','
    }
}

/// Read a CSV or TSV file (chosen by extension) whose cells are all numeric.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<NumericTable> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open table: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| {
            format!("Failed to read row {} of {}", row_idx + 1, path.display())
        })?;
        let mut row = Vec::with_capacity(headers.len());
        for (col_idx, cell) in record.iter().enumerate() {
            let value = cell.parse::<f64>().map_err(|_| {
                anyhow!(
                    "{}: row {} column '{}': cannot parse '{}' as a number",
                    path.display(),
                    row_idx + 1,
                    headers.get(col_idx).map(String::as_str).unwrap_or("?"),
                    cell
                )
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        bail!("Table {} has no data rows", path.display());
    }

    let values = Array2::from_rows(rows)
        .with_context(|| format!("Ragged rows in {}", path.display()))?;
    log::debug!(
        "Read {} rows x {} columns from {}",
        values.nrows(),
        values.ncols(),
        path.display()
    );
    Ok(NumericTable { headers, values })
}

/// Read a training or test split. The target is `target_column` when given,
/// otherwise the last column.
pub fn read_numeric_table<P: AsRef<Path>>(path: P, target_column: Option<&str>) -> Result<Dataset> {
    let path = path.as_ref();
    let table = read_table(path)?;
    let ncols = table.values.ncols();

    let target_idx = match target_column {
        Some(name) => table
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("Target column '{}' not found in {}", name, path.display()))?,
        None => ncols.saturating_sub(1),
    };

    // Move the target to the end so the split is always "last column".
    let order: Vec<usize> = (0..ncols)
        .filter(|&c| c != target_idx)
        .chain(std::iter::once(target_idx))
        .collect();
    let reordered: Vec<Vec<f64>> = table
        .values
        .to_rows()
        .into_iter()
        .map(|row| order.iter().map(|&c| row[c]).collect())
        .collect();
    let values = Array2::from_rows(reordered)?;
    let feature_names = order[..order.len().saturating_sub(1)]
        .iter()
        .map(|&c| table.headers[c].clone())
        .collect();

    split_features_target(&values, feature_names)
        .with_context(|| format!("Failed to split features and target of {}", path.display()))
}

/// Read a feature-only table for prediction.
pub fn read_feature_table<P: AsRef<Path>>(path: P) -> Result<NumericTable> {
    read_table(path)
}

/// Write one prediction per line under a `prediction` header.
pub fn write_predictions<P: AsRef<Path>>(path: P, predictions: &[f64]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter_for(path))
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(["prediction"])?;
    for p in predictions {
        writer.write_record([p.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
