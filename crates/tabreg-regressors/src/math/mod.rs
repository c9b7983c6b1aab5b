//! Small dense containers used throughout the crate.
//!
//! `Array2` is a row-major feature matrix and `Array1` a target vector. Model
//! wrappers convert them into whatever layout their backing library expects
//! (see `models::utils`).
pub mod matrix;
pub mod vector;

pub use matrix::{Array2, ShapeError};
pub use vector::Array1;
