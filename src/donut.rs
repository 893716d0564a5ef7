//! HiCCUPS-style donut filter.
//!
//! The local background of a pixel is estimated from a ring-shaped neighbourhood:
//! a `(2W+1) x (2W+1)` window with the central `(2P+1) x (2P+1)` square and the
//! remaining arms of the centre row and column taken out. The same kernel is
//! applied to the distance-decay expectation, and the ratio of the two rescales
//! that expectation to the local neighbourhood.

use ndarray::{s, Array2, ArrayView2};

use crate::diagonal::{diagonal_mean, ensure_square, toeplitz};
use crate::error::{CoolboxError, Result};
use crate::rucoolbox_structs::ContactMatrix;

/// Inner exclusion half-width `p` and outer half-width `w`, `0 < p < w`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DonutParams {
    p: usize,
    w: usize,
}

impl DonutParams {
    pub fn new(p: usize, w: usize) -> Result<Self> {
        if p == 0 || w == 0 {
            return Err(CoolboxError::config(
                "normalize",
                format!("hiccups parameters must be positive, got p={} w={}", p, w),
            ));
        }
        if p >= w {
            return Err(CoolboxError::config(
                "normalize",
                format!("hiccups requires p < w, got p={} w={}", p, w),
            ));
        }
        Ok(DonutParams { p, w })
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn w(&self) -> usize {
        self.w
    }
}

pub fn donut_kernel(params: DonutParams) -> Array2<f64> {
    let (p, w) = (params.p, params.w);
    let size = 2 * w + 1;
    let mut kernel = Array2::from_elem((size, size), 1.0);

    kernel.slice_mut(s![w - p..=w + p, w - p..=w + p]).fill(0.0);

    // centre column / row outside the inner square
    kernel.slice_mut(s![..w - p, w]).fill(0.0);
    kernel.slice_mut(s![w + p + 1.., w]).fill(0.0);
    kernel.slice_mut(s![w, ..w - p]).fill(0.0);
    kernel.slice_mut(s![w, w + p + 1..]).fill(0.0);

    kernel
}

/// Same-size 2D convolution with zeros outside `input`. `kernel` must be odd-sized.
fn convolve_same(input: ArrayView2<f64>, kernel: ArrayView2<f64>) -> Array2<f64> {
    let (rows, cols) = input.dim();
    let (k_rows, k_cols) = kernel.dim();
    let (r_row, r_col) = ((k_rows / 2) as isize, (k_cols / 2) as isize);
    let mut out = Array2::zeros((rows, cols));

    for i in 0..rows {
        for j in 0..cols {
            let mut acc = 0.0;
            for a in 0..k_rows {
                let y = i as isize + r_row - a as isize;
                if y < 0 || y >= rows as isize {
                    continue;
                }
                for b in 0..k_cols {
                    let k = kernel[[a, b]];
                    if k == 0.0 {
                        continue;
                    }
                    let x = j as isize + r_col - b as isize;
                    if x < 0 || x >= cols as isize {
                        continue;
                    }
                    acc += k * input[[y as usize, x as usize]];
                }
            }
            out[[i, j]] = acc;
        }
    }

    out
}

/// Convolve `matrix` with the donut kernel after padding `w - 1` zeros on every side,
/// then crop back to the input shape.
pub fn apply_donut(matrix: ArrayView2<f64>, params: DonutParams) -> Array2<f64> {
    let kernel = donut_kernel(params);
    let (rows, cols) = matrix.dim();
    let pad = params.w - 1;

    let mut padded = Array2::<f64>::zeros((rows + 2 * pad, cols + 2 * pad));
    padded
        .slice_mut(s![pad..pad + rows, pad..pad + cols])
        .assign(&matrix);

    let filtered = convolve_same(padded.view(), kernel.view());
    let cropped = filtered
        .slice(s![pad..pad + rows, pad..pad + cols])
        .to_owned();
    debug_assert_eq!(cropped.dim(), matrix.dim());
    cropped
}

/// Divide `matrix` by its donut-based local expectation.
pub fn hiccups_normalize(matrix: &ContactMatrix, params: DonutParams) -> Result<ContactMatrix> {
    ensure_square(matrix.view())?;
    let means = diagonal_mean(matrix.view())?;
    let exp_decay = toeplitz(&means);

    let m_donut = apply_donut(matrix.view(), params);
    let exp_donut = apply_donut(exp_decay.view(), params);
    let expected = (&m_donut / &exp_donut) * &exp_decay;

    Ok(matrix / &expected)
}
