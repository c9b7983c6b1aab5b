//! Readers and writers for numeric CSV/TSV tables.
pub mod table;

pub use table::{read_feature_table, read_numeric_table, write_predictions, NumericTable};
