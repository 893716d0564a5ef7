use ndarray::{s, Array1, Array2, ArrayView2};

use crate::error::{CoolboxError, Result};
use crate::rucoolbox_structs::{ContactMatrix, ZeroNanMask};

/// Value substituted for zeros and NaNs so later divisions and logs stay finite.
pub const SMALL_VALUE: f64 = 1e-12;

pub fn fill_zero_nan(matrix: &ContactMatrix) -> (ContactMatrix, ZeroNanMask) {
    let zeros = matrix.mapv(|v| v == 0.0);
    let nans = matrix.mapv(f64::is_nan);
    let filled = matrix.mapv(|v| if v == 0.0 || v.is_nan() { SMALL_VALUE } else { v });
    (filled, ZeroNanMask { zeros, nans })
}

pub(crate) fn ensure_square(matrix: ArrayView2<f64>) -> Result<usize> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(CoolboxError::InvalidMatrix(format!(
            "expected a square matrix, got {} x {}",
            rows, cols
        )));
    }
    if rows == 0 {
        return Err(CoolboxError::InvalidMatrix("empty matrix".to_string()));
    }
    Ok(rows)
}

/// Mean of every upper diagonal, offset 0..n.
pub fn diagonal_mean(matrix: ArrayView2<f64>) -> Result<Array1<f64>> {
    let n = ensure_square(matrix)?;
    let mut means = Array1::zeros(n);
    for k in 0..n {
        let diagonal = matrix.slice(s![..n - k, k..]);
        let diagonal = diagonal.diag();
        means[k] = diagonal.sum() / diagonal.len() as f64;
    }
    Ok(means)
}

/// Mean and population standard deviation of every upper diagonal.
///
/// Zero standard deviations are replaced with the smallest positive one so the
/// profile can be divided by. With no positive deviation at all the std profile
/// is all ones.
pub fn diagonal_mean_std(matrix: ArrayView2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
    let n = ensure_square(matrix)?;
    let mut means = Array1::zeros(n);
    let mut stds = Array1::zeros(n);
    for k in 0..n {
        let diagonal = matrix.slice(s![..n - k, k..]);
        let diagonal = diagonal.diag();
        let len = diagonal.len() as f64;
        let mean = diagonal.sum() / len;
        let var = diagonal.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / len;
        means[k] = mean;
        stds[k] = var.sqrt();
    }

    let min_positive = stds
        .iter()
        .copied()
        .filter(|s| *s > 0.0)
        .fold(f64::INFINITY, f64::min);
    let fill = if min_positive.is_finite() { min_positive } else { 1.0 };
    stds.mapv_inplace(|s| if s == 0.0 { fill } else { s });

    Ok((means, stds))
}

/// Symmetric Toeplitz matrix: entry `[i, j]` is `profile[|i - j|]`.
pub fn toeplitz(profile: &Array1<f64>) -> Array2<f64> {
    let n = profile.len();
    Array2::from_shape_fn((n, n), |(i, j)| profile[i.abs_diff(j)])
}
