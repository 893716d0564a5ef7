use std::path::PathBuf;
use std::sync::Arc;

use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2, ToPyArray};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::diagonal::{diagonal_mean, fill_zero_nan, toeplitz};
use crate::error::CoolboxError;
use crate::geometry::interval_box;
use crate::loops::IntervalIndex;
use crate::normalize::{normalize_matrix, BoxError, NormalizeConfig, ProcessFunc};
use crate::rucoolbox_structs::{ContactMatrix, Side, Style};
use crate::samtools_cov::parse_samtools_cov;

impl From<CoolboxError> for PyErr {
    fn from(err: CoolboxError) -> PyErr {
        match err {
            CoolboxError::Io(e) => PyIOError::new_err(e.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

/// Wrap a Python callable as a process function. Source strings are refused.
fn python_process_func(py: Python<'_>, func: PyObject) -> PyResult<ProcessFunc> {
    if !func.bind(py).is_callable() {
        return Err(CoolboxError::config(
            "process_func",
            "expected a callable taking one matrix argument",
        )
        .into());
    }
    Ok(Arc::new(move |m: &ContactMatrix| {
        Python::with_gil(|py| -> Result<ContactMatrix, BoxError> {
            let out = func.bind(py).call1((m.to_pyarray(py),))?;
            let arr: PyReadonlyArray2<f64> = out.extract()?;
            Ok(arr.as_array().to_owned())
        })
    }))
}

#[pyfunction]
#[pyo3(signature = (matrix, transform = "no", normalize = "no", gaussian_sigma = None, process_func = None))]
pub fn normalize_matrix_numpy<'py>(
    py: Python<'py>,
    matrix: PyReadonlyArray2<'py, f64>,
    transform: &str,
    normalize: &str,
    gaussian_sigma: Option<f64>,
    process_func: Option<PyObject>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let mut config = NormalizeConfig::default()
        .transform(transform.parse()?)
        .normalize(normalize.parse()?);
    config.gaussian_sigma = gaussian_sigma;
    if let Some(func) = process_func {
        config.process_func = Some(python_process_func(py, func)?);
    }

    let input = matrix.as_array().to_owned();
    let out = normalize_matrix(&input, &config)?;
    Ok(out.into_pyarray(py))
}

#[pyfunction]
pub fn fill_zero_nan_numpy<'py>(
    py: Python<'py>,
    matrix: PyReadonlyArray2<'py, f64>,
) -> (Bound<'py, PyArray2<f64>>, Bound<'py, PyArray2<bool>>, Bound<'py, PyArray2<bool>>) {
    let (filled, mask) = fill_zero_nan(&matrix.as_array().to_owned());
    (
        filled.into_pyarray(py),
        mask.zeros.into_pyarray(py),
        mask.nans.into_pyarray(py),
    )
}

#[pyfunction]
pub fn diagonal_mean_numpy<'py>(
    py: Python<'py>,
    matrix: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let means = diagonal_mean(matrix.as_array())?;
    Ok(means.into_pyarray(py))
}

#[pyfunction]
pub fn toeplitz_numpy<'py>(
    py: Python<'py>,
    profile: PyReadonlyArray1<'py, f64>,
) -> Bound<'py, PyArray2<f64>> {
    toeplitz(&profile.as_array().to_owned()).into_pyarray(py)
}

#[pyfunction]
#[pyo3(signature = (x1, x2, y1, y2, style = "triangular", side = "upper"))]
pub fn interval_box_py(
    x1: i64,
    x2: i64,
    y1: i64,
    y2: i64,
    style: &str,
    side: &str,
) -> PyResult<(f64, f64, f64, f64)> {
    let style: Style = style.parse()?;
    let side: Side = side.parse()?;
    let b = interval_box(x1, x2, y1, y2, style, side);
    Ok((b.x, b.y, b.width, b.height))
}

#[pyfunction]
pub fn parse_samtools_cov_py(lines: Vec<String>) -> PyResult<Vec<f64>> {
    Ok(parse_samtools_cov(lines.as_slice())?)
}

type LoopTuple = (String, i64, i64, String, i64, i64, String);

#[pyclass(name = "IntervalIndex", frozen)]
pub struct PyIntervalIndex {
    inner: IntervalIndex,
}

#[pymethods]
impl PyIntervalIndex {
    #[new]
    fn new(path: PathBuf) -> PyResult<Self> {
        Ok(PyIntervalIndex {
            inner: IntervalIndex::load(path)?,
        })
    }

    fn query(&self, chrom: &str, start: i64, end: i64) -> Vec<LoopTuple> {
        self.inner
            .query(chrom, start, end)
            .map(|l| {
                (
                    l.chrom1.clone(),
                    l.start1,
                    l.end1,
                    l.chrom2.clone(),
                    l.start2,
                    l.end2,
                    l.color.clone(),
                )
            })
            .collect()
    }

    fn chromosomes(&self) -> Vec<String> {
        self.inner.chromosomes().into_iter().map(String::from).collect()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}

#[pymodule]
fn rucoolbox(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(normalize_matrix_numpy, m)?)?;
    m.add_function(wrap_pyfunction!(fill_zero_nan_numpy, m)?)?;
    m.add_function(wrap_pyfunction!(diagonal_mean_numpy, m)?)?;
    m.add_function(wrap_pyfunction!(toeplitz_numpy, m)?)?;
    m.add_function(wrap_pyfunction!(interval_box_py, m)?)?;
    m.add_function(wrap_pyfunction!(parse_samtools_cov_py, m)?)?;
    m.add_class::<PyIntervalIndex>()?;
    Ok(())
}
