// 목적:
// - 인덱스 객체 없이 호출하는 모듈 수준 함수를 제공한다.
//
// 설명:
// - 일회성 k-NN, k-means 클러스터 중심, 전역 로그 수준/거리 종류 설정,
//   적재된 라이브러리 경로 조회, 로깅 초기화를 노출한다.
//
// 참조:
// - src_rs/index/ops.rs

use numpy::PyArray2;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::api::arrays::{extract_matrix, require_matrix, to_pyarray2, unsupported_dtype};
use crate::api::errors::to_py_err;
use crate::api::params_bridge::apply_kwargs;
use crate::core::logging;
use crate::index::handle::KnnResult;
use crate::index::matrix::Matrix;
use crate::index::ops;
use crate::loader::library::FlannLibrary;
use crate::loader::signatures::Element;
use crate::params::options::{Algorithm, DistanceType, LogLevel, SymbolicOption};
use crate::params::record::FlannParameters;

/// 인덱스를 만들지 않고 pts 전체에서 qpts의 최근접 이웃을 찾는다.
#[pyfunction]
#[pyo3(signature = (pts, qpts, num_neighbors = 1, **kwargs))]
pub fn nn<'py>(
    py: Python<'py>,
    pts: &Bound<'py, PyAny>,
    qpts: &Bound<'py, PyAny>,
    num_neighbors: usize,
    kwargs: Option<&Bound<'py, PyDict>>,
) -> PyResult<(Bound<'py, PyArray2<i32>>, Bound<'py, PyAny>)> {
    let mut params = FlannParameters::default();
    apply_kwargs(&mut params, kwargs)?;
    let library = FlannLibrary::global().map_err(to_py_err)?;

    if let Some(dataset) = extract_matrix::<f32>(pts) {
        let result = search::<f32>(&library, dataset?, qpts, num_neighbors, &params)?;
        let dists = to_pyarray2(py, result.dists, result.rows, result.nn)?.into_any();
        return Ok((to_pyarray2(py, result.indices, result.rows, result.nn)?, dists));
    }
    if let Some(dataset) = extract_matrix::<f64>(pts) {
        let result = search::<f64>(&library, dataset?, qpts, num_neighbors, &params)?;
        let dists = to_pyarray2(py, result.dists, result.rows, result.nn)?.into_any();
        return Ok((to_pyarray2(py, result.indices, result.rows, result.nn)?, dists));
    }
    if let Some(dataset) = extract_matrix::<u8>(pts) {
        let result = search::<u8>(&library, dataset?, qpts, num_neighbors, &params)?;
        let dists = to_pyarray2(py, result.dists, result.rows, result.nn)?.into_any();
        return Ok((to_pyarray2(py, result.indices, result.rows, result.nn)?, dists));
    }
    if let Some(dataset) = extract_matrix::<i32>(pts) {
        let result = search::<i32>(&library, dataset?, qpts, num_neighbors, &params)?;
        let dists = to_pyarray2(py, result.dists, result.rows, result.nn)?.into_any();
        return Ok((to_pyarray2(py, result.indices, result.rows, result.nn)?, dists));
    }

    Err(unsupported_dtype())
}

fn search<T>(
    library: &FlannLibrary,
    dataset: Matrix<T>,
    qpts: &Bound<'_, PyAny>,
    nn: usize,
    params: &FlannParameters,
) -> PyResult<KnnResult<T::Dist>>
where
    T: Element + numpy::Element,
{
    let testset = require_matrix::<T>(qpts)?;
    ops::find_nearest_neighbors(library, dataset.view(), testset.view(), nn, params).map_err(to_py_err)
}

/// 계층 k-means로 클러스터 중심을 계산한다.
///
/// max_iterations가 없으면 수렴할 때까지 반복한다(-1).
/// num_clusters는 분기 계수로도 쓰이므로 2 이상이어야 한다.
#[pyfunction]
#[pyo3(signature = (pts, num_clusters, max_iterations = None, **kwargs))]
pub fn kmeans_centers<'py>(
    py: Python<'py>,
    pts: &Bound<'py, PyAny>,
    num_clusters: usize,
    max_iterations: Option<i32>,
    kwargs: Option<&Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyAny>> {
    if num_clusters < ops::MIN_CLUSTERS {
        return Err(PyValueError::new_err(format!(
            "num_clusters는 {} 이상이어야 합니다: {}",
            ops::MIN_CLUSTERS,
            num_clusters
        )));
    }

    let mut params = FlannParameters::default().with_algorithm(Algorithm::KMeans);
    apply_kwargs(&mut params, kwargs)?;
    params.iterations = max_iterations.unwrap_or(-1);
    params.branching = i32::try_from(num_clusters).unwrap_or(i32::MAX);

    let library = FlannLibrary::global().map_err(to_py_err)?;

    macro_rules! centers {
        ($ty:ty, $dataset:expr) => {{
            let dataset: Matrix<$ty> = $dataset?;
            let centers = ops::compute_cluster_centers(&library, dataset.view(), num_clusters, &params)
                .map_err(to_py_err)?;
            let (rows, cols) = (centers.rows(), centers.cols());
            return Ok(to_pyarray2(py, centers.into_vec(), rows, cols)?.into_any());
        }};
    }

    if let Some(dataset) = extract_matrix::<f32>(pts) {
        centers!(f32, dataset);
    }
    if let Some(dataset) = extract_matrix::<f64>(pts) {
        centers!(f64, dataset);
    }
    if let Some(dataset) = extract_matrix::<u8>(pts) {
        centers!(u8, dataset);
    }
    if let Some(dataset) = extract_matrix::<i32>(pts) {
        centers!(i32, dataset);
    }

    Err(unsupported_dtype())
}

/// 이후 생성되는 인덱스의 거리 종류를 설정한다.
#[pyfunction]
#[pyo3(signature = (distance_type, order = 0))]
pub fn set_distance_type(distance_type: &str, order: i32) -> PyResult<()> {
    let distance = DistanceType::parse(distance_type).map_err(to_py_err)?;
    let library = FlannLibrary::global().map_err(to_py_err)?;
    ops::set_distance_type(&library, distance, order);
    Ok(())
}

/// 네이티브 라이브러리의 로그 수준을 설정한다.
#[pyfunction]
pub fn log_verbosity(level: &str) -> PyResult<()> {
    let level = LogLevel::parse(level).map_err(to_py_err)?;
    let library = FlannLibrary::global().map_err(to_py_err)?;
    ops::set_log_verbosity(&library, level);
    Ok(())
}

/// 적재된 공유 라이브러리 경로를 돌려준다.
#[pyfunction]
pub fn library_path() -> PyResult<String> {
    let library = FlannLibrary::global().map_err(to_py_err)?;
    Ok(library.path().display().to_string())
}

#[pyfunction]
pub fn parameter_keys() -> Vec<&'static str> {
    FlannParameters::keys().collect()
}

/// Rust 계층 로깅(tracing)을 초기화한다.
#[pyfunction]
pub fn init_logging() {
    logging::init_logging();
}
