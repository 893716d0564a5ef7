use ndarray::{Array1, Array2, ArrayView2, Axis};

const TRUNCATE: f64 = 4.0;

fn gaussian_weights(sigma: f64) -> Array1<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as isize;
    let mut weights: Array1<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x * x) as f64 / (sigma * sigma)).exp())
        .collect();
    let total = weights.sum();
    weights /= total;
    weights
}

/// Half-sample symmetric boundary: `d c b a | a b c d | d c b a`.
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period);
    if m < n as isize {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}

fn filter_axis(input: ArrayView2<f64>, weights: &Array1<f64>, axis: Axis) -> Array2<f64> {
    let radius = (weights.len() / 2) as isize;
    let mut out = Array2::zeros(input.raw_dim());
    for (lane_in, mut lane_out) in input.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let n = lane_in.len();
        for i in 0..n {
            let mut acc = 0.0;
            for (k, w) in weights.iter().enumerate() {
                let src = reflect(i as isize + k as isize - radius, n);
                acc += w * lane_in[src];
            }
            lane_out[i] = acc;
        }
    }
    out
}

/// Separable Gaussian blur. `sigma` must be positive and finite.
pub fn gaussian_filter(matrix: ArrayView2<f64>, sigma: f64) -> Array2<f64> {
    if matrix.is_empty() {
        return matrix.to_owned();
    }
    let weights = gaussian_weights(sigma);
    let rows_done = filter_axis(matrix, &weights, Axis(0));
    filter_axis(rows_done.view(), &weights, Axis(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn weights_are_normalised() {
        let w = gaussian_weights(1.5);
        assert_eq!(w.len(), 2 * 6 + 1);
        assert!((w.sum() - 1.0).abs() < 1e-12);
        assert!(w[6] > w[5] && w[5] > w[4]);
    }

    #[test]
    fn reflect_indices() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        assert_eq!(reflect(2, 4), 2);
        assert_eq!(reflect(-9, 4), 0);
    }

    #[test]
    fn constant_matrix_is_unchanged() {
        let m = Array2::from_elem((5, 7), 3.0);
        let out = gaussian_filter(m.view(), 2.0);
        for v in out.iter() {
            assert!((v - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn blur_preserves_mass_and_spreads_peak() {
        let mut m = Array2::zeros((9, 9));
        m[[4, 4]] = 1.0;
        let out = gaussian_filter(m.view(), 1.0);
        assert!((out.sum() - 1.0).abs() < 1e-12);
        assert!(out[[4, 4]] < 1.0);
        assert!(out[[4, 5]] > 0.0);
        assert!((out[[3, 4]] - out[[5, 4]]).abs() < 1e-15);
    }

    #[test]
    fn does_not_touch_input() {
        let m = array![[1.0, 2.0], [3.0, 4.0]];
        let _ = gaussian_filter(m.view(), 0.5);
        assert_eq!(m, array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn impulse_response_sigma_one() {
        let mut m = Array2::zeros((9, 9));
        m[[4, 4]] = 1.0;
        let out = gaussian_filter(m.view(), 1.0);
        // 1D weights at offsets 0, 1, 2: 0.398943, 0.241971, 0.053991
        assert!((out[[4, 4]] - 0.159_155_891_7).abs() < 1e-9);
        assert!((out[[4, 5]] - 0.096_532_928_0).abs() < 1e-9);
        assert!((out[[2, 4]] - 0.021_539_407_7).abs() < 1e-9);
        assert!((out[[4, 5]] / out[[4, 4]] - (-0.5f64).exp()).abs() < 1e-12);
        assert!((out[[4, 6]] / out[[4, 4]] - (-2.0f64).exp()).abs() < 1e-12);
    }
}

