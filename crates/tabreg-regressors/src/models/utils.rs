//! Layout conversions from the crate containers to each library's types.
use anyhow::{ensure, Result};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::math::Array2;

pub fn to_dense_matrix(x: &Array2<f64>) -> Result<DenseMatrix<f64>> {
    ensure!(!x.is_empty(), "Cannot build a matrix from an empty feature table");
    Ok(DenseMatrix::from_2d_vec(&x.to_rows()))
}

pub fn to_ndarray(x: &Array2<f64>) -> Result<ndarray::Array2<f64>> {
    Ok(ndarray::Array2::from_shape_vec(
        x.shape(),
        x.as_slice().to_vec(),
    )?)
}

pub fn to_f32_rows(x: &Array2<f64>) -> Vec<Vec<f32>> {
    (0..x.nrows())
        .map(|r| x.row_slice(r).iter().map(|&v| v as f32).collect())
        .collect()
}

/// Reject targets and features with NaN or infinite values; the tree
/// libraries panic on them instead of returning an error.
pub fn ensure_finite(x: &Array2<f64>, y: &[f64]) -> Result<()> {
    ensure!(
        x.nrows() == y.len(),
        "Feature matrix has {} rows but target has {} values",
        x.nrows(),
        y.len()
    );
    ensure!(
        x.as_slice().iter().all(|v| v.is_finite()),
        "Feature matrix contains NaN or infinite values"
    );
    ensure!(
        y.iter().all(|v| v.is_finite()),
        "Target contains NaN or infinite values"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndarray_keeps_row_major_order() {
        let x = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let arr = to_ndarray(&x).unwrap();
        assert_eq!(arr[[0, 1]], 2.0);
        assert_eq!(arr[[1, 0]], 3.0);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let x = Array2::from_shape_vec((2, 1), vec![1.0, f64::NAN]).unwrap();
        assert!(ensure_finite(&x, &[1.0, 2.0]).is_err());
        let x = Array2::from_shape_vec((2, 1), vec![1.0, 2.0]).unwrap();
        assert!(ensure_finite(&x, &[1.0, f64::INFINITY]).is_err());
        assert!(ensure_finite(&x, &[1.0]).is_err());
        assert!(ensure_finite(&x, &[1.0, 2.0]).is_ok());
    }
}
