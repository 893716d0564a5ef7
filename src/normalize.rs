//! Display normalisation of Hi-C contact matrices.
//!
//! Stages always run in the order transform -> normalize -> gaussian -> process_func;
//! any stage left at its "off" value is skipped. The input matrix is never modified.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, error};

use crate::diagonal::{diagonal_mean, diagonal_mean_std, toeplitz};
use crate::donut::{hiccups_normalize, DonutParams};
use crate::error::{CoolboxError, Result};
use crate::gaussian::gaussian_filter;
use crate::rucoolbox_structs::ContactMatrix;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Caller-registered matrix -> matrix hook run as the last stage.
pub type ProcessFunc =
    Arc<dyn Fn(&ContactMatrix) -> std::result::Result<ContactMatrix, BoxError> + Send + Sync>;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Transform {
    #[default]
    No,
    Log,
    Log2,
    Log10,
}

impl FromStr for Transform {
    type Err = CoolboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "no" | "none" => Ok(Transform::No),
            "log" => Ok(Transform::Log),
            "log2" => Ok(Transform::Log2),
            "log10" => Ok(Transform::Log10),
            other => Err(CoolboxError::config(
                "transform",
                format!("expected one of no, log, log2, log10; got {:?}", other),
            )),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Transform::No => "no",
            Transform::Log => "log",
            Transform::Log2 => "log2",
            Transform::Log10 => "log10",
        };
        f.write_str(s)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum NormalizeMethod {
    #[default]
    No,
    Total,
    Expect,
    ZScore,
    Hiccups(DonutParams),
}

fn parse_hiccups(text: &str) -> Result<DonutParams> {
    let bad = || {
        CoolboxError::config(
            "normalize",
            format!("expected hiccups:P:W with positive integers, got {:?}", text),
        )
    };
    let rest = text.strip_prefix("hiccups:").ok_or_else(bad)?;
    let mut parts = rest.split(':');
    let p = parts.next().ok_or_else(bad)?;
    let w = parts.next().ok_or_else(bad)?;
    if parts.next().is_some() {
        return Err(bad());
    }
    let p: usize = p.trim().parse().map_err(|_| bad())?;
    let w: usize = w.trim().parse().map_err(|_| bad())?;
    DonutParams::new(p, w)
}

impl FromStr for NormalizeMethod {
    type Err = CoolboxError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "no" | "none" => Ok(NormalizeMethod::No),
            "total" => Ok(NormalizeMethod::Total),
            "expect" => Ok(NormalizeMethod::Expect),
            "zscore" => Ok(NormalizeMethod::ZScore),
            other if other.starts_with("hiccups:") => {
                parse_hiccups(other).map(NormalizeMethod::Hiccups)
            }
            other => Err(CoolboxError::config(
                "normalize",
                format!(
                    "expected one of no, total, expect, zscore, hiccups:P:W; got {:?}",
                    other
                ),
            )),
        }
    }
}

impl fmt::Display for NormalizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeMethod::No => f.write_str("no"),
            NormalizeMethod::Total => f.write_str("total"),
            NormalizeMethod::Expect => f.write_str("expect"),
            NormalizeMethod::ZScore => f.write_str("zscore"),
            NormalizeMethod::Hiccups(params) => {
                write!(f, "hiccups:{}:{}", params.p(), params.w())
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct NormalizeConfig {
    pub transform: Transform,
    pub normalize: NormalizeMethod,
    pub gaussian_sigma: Option<f64>,
    pub process_func: Option<ProcessFunc>,
}

impl fmt::Debug for NormalizeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizeConfig")
            .field("transform", &self.transform)
            .field("normalize", &self.normalize)
            .field("gaussian_sigma", &self.gaussian_sigma)
            .field("process_func", &self.process_func.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl NormalizeConfig {
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn normalize(mut self, method: NormalizeMethod) -> Self {
        self.normalize = method;
        self
    }

    pub fn gaussian_sigma(mut self, sigma: f64) -> Self {
        self.gaussian_sigma = Some(sigma);
        self
    }

    pub fn process_func<F>(mut self, func: F) -> Self
    where
        F: Fn(&ContactMatrix) -> std::result::Result<ContactMatrix, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.process_func = Some(Arc::new(func));
        self
    }
}

pub fn transform_matrix(matrix: &ContactMatrix, transform: Transform) -> ContactMatrix {
    match transform {
        Transform::No => matrix.clone(),
        Transform::Log => matrix.mapv(f64::ln),
        Transform::Log2 => matrix.mapv(f64::log2),
        Transform::Log10 => matrix.mapv(f64::log10),
    }
}

pub fn normalize_by(matrix: &ContactMatrix, method: NormalizeMethod) -> Result<ContactMatrix> {
    let res = match method {
        NormalizeMethod::No => matrix.clone(),
        NormalizeMethod::Total => {
            let total = matrix.sum();
            if total != 0.0 {
                matrix / total
            } else {
                matrix.clone()
            }
        }
        NormalizeMethod::Expect => {
            let expect = toeplitz(&diagonal_mean(matrix.view())?);
            matrix / &expect
        }
        NormalizeMethod::ZScore => {
            let (means, stds) = diagonal_mean_std(matrix.view())?;
            let mat_mean = toeplitz(&means);
            let mat_std = toeplitz(&stds);
            (matrix - &mat_mean) / &mat_std
        }
        NormalizeMethod::Hiccups(params) => hiccups_normalize(matrix, params)?,
    };
    Ok(res)
}

pub fn normalize_matrix(matrix: &ContactMatrix, config: &NormalizeConfig) -> Result<ContactMatrix> {
    let mut arr = matrix.clone();

    if config.transform != Transform::No {
        debug!(transform = %config.transform, "transforming matrix");
        arr = transform_matrix(&arr, config.transform);
    }

    if config.normalize != NormalizeMethod::No {
        debug!(normalize = %config.normalize, "normalizing matrix");
        arr = normalize_by(&arr, config.normalize)?;
    }

    if let Some(sigma) = config.gaussian_sigma {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(CoolboxError::config(
                "gaussian_sigma",
                format!("sigma must be a positive number, got {}", sigma),
            ));
        }
        debug!(sigma, "gaussian smoothing");
        arr = gaussian_filter(arr.view(), sigma);
    }

    if let Some(func) = &config.process_func {
        debug!("applying process_func");
        arr = func(&arr).map_err(|e| {
            error!("{}", e);
            CoolboxError::config(
                "process_func",
                format!(
                    "process_func should be a one argument function that receives a matrix \
                     and returns a processed matrix: {}",
                    e
                ),
            )
        })?;
    }

    Ok(arr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn close(a: &ContactMatrix, b: &ContactMatrix, tol: f64) -> bool {
        a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tol)
    }

    #[test]
    fn parse_modes() {
        assert_eq!("no".parse::<Transform>().unwrap(), Transform::No);
        assert_eq!("log10".parse::<Transform>().unwrap(), Transform::Log10);
        assert!(matches!(
            "ln".parse::<Transform>(),
            Err(CoolboxError::Configuration { option: "transform", .. })
        ));
        assert_eq!("zscore".parse::<NormalizeMethod>().unwrap(), NormalizeMethod::ZScore);
        assert_eq!(
            "hiccups:1:3".parse::<NormalizeMethod>().unwrap(),
            NormalizeMethod::Hiccups(DonutParams::new(1, 3).unwrap())
        );
        assert_eq!(
            "hiccups:2:10".parse::<NormalizeMethod>().unwrap().to_string(),
            "hiccups:2:10"
        );
        assert!(matches!(
            "median".parse::<NormalizeMethod>(),
            Err(CoolboxError::Configuration { option: "normalize", .. })
        ));
    }

    #[test]
    fn hiccups_string_errors() {
        for bad in ["hiccups:3:3", "hiccups:5:2", "hiccups:1", "hiccups:a:3", "hiccups:1:2:3", "hiccups:0:2"] {
            assert!(
                matches!(
                    bad.parse::<NormalizeMethod>(),
                    Err(CoolboxError::Configuration { option: "normalize", .. })
                ),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn total_sums_to_one() {
        let m = array![[1.0, 2.0, 3.0], [2.0, 4.0, 5.0], [3.0, 5.0, 6.0]];
        let cfg = NormalizeConfig::default().normalize(NormalizeMethod::Total);
        let out = normalize_matrix(&m, &cfg).unwrap();
        assert!((out.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn total_of_zero_sum_is_identity() {
        let m = array![[1.0, -1.0], [-1.0, 1.0]];
        let cfg = NormalizeConfig::default().normalize(NormalizeMethod::Total);
        let out = normalize_matrix(&m, &cfg).unwrap();
        assert_eq!(out, m);
    }

    #[test]
    fn log2_round_trip() {
        let m = array![[0.5, 3.0], [3.0, 1024.0]];
        let cfg = NormalizeConfig::default().transform(Transform::Log2);
        let out = normalize_matrix(&m, &cfg).unwrap();
        let back = out.mapv(|v| 2f64.powf(v));
        assert!(close(&back, &m, 1e-9));
    }

    #[test]
    fn log_transforms_pin_values() {
        let m = array![[1.0, std::f64::consts::E], [100.0, 0.001]];
        let ln = transform_matrix(&m, Transform::Log);
        assert!(close(&ln, &array![[0.0, 1.0], [100f64.ln(), 0.001f64.ln()]], 1e-12));
        assert!((ln[[1, 0]] - 4.605_170_186).abs() < 1e-9);

        let lg = transform_matrix(&m, Transform::Log10);
        assert!(close(&lg, &array![[0.0, std::f64::consts::LOG10_E], [2.0, -3.0]], 1e-12));
    }

    #[test]
    fn expect_divides_by_diagonal_means() {
        let m = array![[2.0, 1.0], [3.0, 4.0]];
        let out = normalize_by(&m, NormalizeMethod::Expect).unwrap();
        // diagonal means: [3, 1]
        let want = array![[2.0 / 3.0, 1.0], [3.0, 4.0 / 3.0]];
        assert!(close(&out, &want, 1e-12));
    }

    #[test]
    fn zscore_centres_each_diagonal() {
        let m = array![[1.0, 2.0, 4.0], [2.0, 3.0, 6.0], [4.0, 6.0, 5.0]];
        let out = normalize_by(&m, NormalizeMethod::ZScore).unwrap();
        // main diagonal [1, 3, 5]: mean 3, population std sqrt(8/3)
        let std0 = (8.0f64 / 3.0).sqrt();
        assert!((out[[0, 0]] + 2.0 / std0).abs() < 1e-12);
        assert!(out[[1, 1]].abs() < 1e-12);
        assert!((out[[2, 2]] - 2.0 / std0).abs() < 1e-12);
    }

    #[test]
    fn stages_run_in_order() {
        let m = Array2::from_elem((4, 4), 8.0);
        let cfg = NormalizeConfig::default()
            .transform(Transform::Log2)
            .normalize(NormalizeMethod::Total)
            .gaussian_sigma(1.0)
            .process_func(|m: &ContactMatrix| Ok(m * 16.0));
        let out = normalize_matrix(&m, &cfg).unwrap();
        // log2(8) = 3 everywhere, / 48 total, blur keeps a constant, * 16
        for v in out.iter() {
            assert!((v - 1.0).abs() < 1e-12);
        }
        assert_eq!(m[[0, 0]], 8.0);
    }

    #[test]
    fn process_func_error_names_stage() {
        let m = Array2::from_elem((2, 2), 1.0);
        let cfg = NormalizeConfig::default()
            .process_func(|_: &ContactMatrix| Err("shape mismatch".into()));
        match normalize_matrix(&m, &cfg) {
            Err(CoolboxError::Configuration { option, message }) => {
                assert_eq!(option, "process_func");
                assert!(message.contains("shape mismatch"));
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn rejects_bad_sigma() {
        let m = Array2::from_elem((2, 2), 1.0);
        let cfg = NormalizeConfig::default().gaussian_sigma(0.0);
        assert!(matches!(
            normalize_matrix(&m, &cfg),
            Err(CoolboxError::Configuration { option: "gaussian_sigma", .. })
        ));
    }

    #[test]
    fn default_config_is_identity() {
        let m = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(normalize_matrix(&m, &NormalizeConfig::default()).unwrap(), m);
    }
}
