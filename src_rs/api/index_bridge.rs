// 목적:
// - Python에서 호출 가능한 인덱스 클래스를 제공한다.
//
// 설명:
// - 최초 build_index/load_index에 전달된 배열의 dtype으로 네이티브 심볼 집합을 고른다.
// - 이후 질의/추가 배열은 같은 dtype이어야 한다.
// - 키워드 인자는 파라미터 레코드에 덮어써지며 레코드에 없는 키는 무시한다.
//
// 디자인 패턴:
// - 파사드(Facade) + 타입 기반 디스패치(Type-Directed Dispatch).
//
// 참조:
// - src_rs/index/handle.rs
// - src_rs/api/arrays.rs

use std::path::PathBuf;

use numpy::{PyArray1, PyArray2};
use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::api::arrays::{extract_matrix, require_matrix, to_pyarray1, to_pyarray2, unsupported_dtype};
use crate::api::errors::to_py_err;
use crate::api::params_bridge::{apply_kwargs, params_to_dict, PyFlannParameters};
use crate::index::handle::FlannIndex;
use crate::index::matrix::Matrix;
use crate::loader::library::FlannLibrary;
use crate::params::record::FlannParameters;

/// dtype별 인덱스.
pub enum AnyIndex {
    Float32(FlannIndex<f32>),
    Float64(FlannIndex<f64>),
    UInt8(FlannIndex<u8>),
    Int32(FlannIndex<i32>),
}

macro_rules! with_index {
    ($any:expr, $index:ident, $elem:ident => $body:expr) => {
        match $any {
            AnyIndex::Float32($index) => {
                type $elem = f32;
                $body
            }
            AnyIndex::Float64($index) => {
                type $elem = f64;
                $body
            }
            AnyIndex::UInt8($index) => {
                type $elem = u8;
                $body
            }
            AnyIndex::Int32($index) => {
                type $elem = i32;
                $body
            }
        }
    };
}

impl AnyIndex {
    fn dtype(&self) -> &'static str {
        match self {
            Self::Float32(_) => "float32",
            Self::Float64(_) => "float64",
            Self::UInt8(_) => "uint8",
            Self::Int32(_) => "int32",
        }
    }
}

/// Python에 노출되는 인덱스 클래스다.
#[pyclass(name = "FlannIndex", unsendable)]
pub struct PyFlannIndex {
    params: FlannParameters,
    index: Option<AnyIndex>,
}

#[pymethods]
impl PyFlannIndex {
    #[new]
    #[pyo3(signature = (params = None, **kwargs))]
    pub fn new(
        params: Option<PyRef<'_, PyFlannParameters>>,
        kwargs: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<Self> {
        let mut base = params.map(|params| params.inner).unwrap_or_default();
        apply_kwargs(&mut base, kwargs)?;
        Ok(Self {
            params: base,
            index: None,
        })
    }

    /// 인덱스를 생성하고 (네이티브가 확정한) 파라미터와 speedup을 dict로 돌려준다.
    #[pyo3(signature = (pts, **kwargs))]
    pub fn build_index<'py>(
        &mut self,
        py: Python<'py>,
        pts: &Bound<'py, PyAny>,
        kwargs: Option<&Bound<'py, PyDict>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        apply_kwargs(&mut self.params, kwargs)?;
        self.index = None;

        let library = FlannLibrary::global().map_err(to_py_err)?;
        let params = self.params;
        let built = if let Some(matrix) = extract_matrix::<f32>(pts) {
            AnyIndex::Float32(FlannIndex::build(library, matrix?, params).map_err(to_py_err)?)
        } else if let Some(matrix) = extract_matrix::<f64>(pts) {
            AnyIndex::Float64(FlannIndex::build(library, matrix?, params).map_err(to_py_err)?)
        } else if let Some(matrix) = extract_matrix::<u8>(pts) {
            AnyIndex::UInt8(FlannIndex::build(library, matrix?, params).map_err(to_py_err)?)
        } else if let Some(matrix) = extract_matrix::<i32>(pts) {
            AnyIndex::Int32(FlannIndex::build(library, matrix?, params).map_err(to_py_err)?)
        } else {
            return Err(unsupported_dtype());
        };

        let (resolved, speedup) = with_index!(&built, index, _E => (*index.params(), index.speedup()));
        self.params = resolved;
        self.index = Some(built);

        let dict = params_to_dict(py, &resolved)?;
        dict.set_item("speedup", speedup)?;
        Ok(dict)
    }

    /// 저장된 인덱스를 원본 데이터셋과 함께 복원한다.
    pub fn load_index(&mut self, filename: PathBuf, pts: &Bound<'_, PyAny>) -> PyResult<()> {
        self.index = None;

        let library = FlannLibrary::global().map_err(to_py_err)?;
        let params = self.params;
        let loaded = if let Some(matrix) = extract_matrix::<f32>(pts) {
            AnyIndex::Float32(FlannIndex::load(library, &filename, matrix?, params).map_err(to_py_err)?)
        } else if let Some(matrix) = extract_matrix::<f64>(pts) {
            AnyIndex::Float64(FlannIndex::load(library, &filename, matrix?, params).map_err(to_py_err)?)
        } else if let Some(matrix) = extract_matrix::<u8>(pts) {
            AnyIndex::UInt8(FlannIndex::load(library, &filename, matrix?, params).map_err(to_py_err)?)
        } else if let Some(matrix) = extract_matrix::<i32>(pts) {
            AnyIndex::Int32(FlannIndex::load(library, &filename, matrix?, params).map_err(to_py_err)?)
        } else {
            return Err(unsupported_dtype());
        };

        self.index = Some(loaded);
        Ok(())
    }

    pub fn save_index(&self, filename: PathBuf) -> PyResult<()> {
        let index = self.require_index()?;
        with_index!(index, index, _E => index.save(&filename).map_err(to_py_err))
    }

    #[pyo3(signature = (pts, rebuild_threshold = 2.0))]
    pub fn add_points(&mut self, pts: &Bound<'_, PyAny>, rebuild_threshold: f32) -> PyResult<()> {
        let index = self.require_index_mut()?;
        with_index!(index, index, E => {
            let points: Matrix<E> = require_matrix::<E>(pts)?;
            index.add_points(points, rebuild_threshold).map_err(to_py_err)
        })
    }

    /// 질의 행마다 num_neighbors개의 이웃 (indices, dists)를 2차원 배열로 돌려준다.
    #[pyo3(signature = (qpts, num_neighbors = 1, **kwargs))]
    pub fn nn_index<'py>(
        &mut self,
        py: Python<'py>,
        qpts: &Bound<'py, PyAny>,
        num_neighbors: usize,
        kwargs: Option<&Bound<'py, PyDict>>,
    ) -> PyResult<(Bound<'py, PyArray2<i32>>, Bound<'py, PyAny>)> {
        apply_kwargs(&mut self.params, kwargs)?;
        let params = self.params;
        let index = self.require_index_mut()?;

        with_index!(index, index, E => {
            index.set_params(params);
            let queries: Matrix<E> = require_matrix::<E>(qpts)?;
            let result = index
                .knn_search(queries.view(), num_neighbors)
                .map_err(to_py_err)?;
            let indices = to_pyarray2(py, result.indices, result.rows, result.nn)?;
            let dists = to_pyarray2(py, result.dists, result.rows, result.nn)?.into_any();
            Ok((indices, dists))
        })
    }

    /// 반경 안의 이웃 (indices, dists)를 1차원 배열로 돌려준다.
    #[pyo3(signature = (query, radius, max_nn = None, **kwargs))]
    pub fn nn_radius<'py>(
        &mut self,
        py: Python<'py>,
        query: &Bound<'py, PyAny>,
        radius: f32,
        max_nn: Option<usize>,
        kwargs: Option<&Bound<'py, PyDict>>,
    ) -> PyResult<(Bound<'py, PyArray1<i32>>, Bound<'py, PyAny>)> {
        apply_kwargs(&mut self.params, kwargs)?;
        let params = self.params;
        let index = self.require_index_mut()?;

        with_index!(index, index, E => {
            index.set_params(params);
            let query: Matrix<E> = require_matrix::<E>(query)?;
            let max_nn = max_nn.unwrap_or_else(|| index.size());
            let result = index
                .radius_search(query.as_slice(), max_nn, radius)
                .map_err(to_py_err)?;
            let indices = to_pyarray1(py, result.indices);
            let dists = to_pyarray1(py, result.dists).into_any();
            Ok((indices, dists))
        })
    }

    pub fn delete_index(&mut self) {
        self.index = None;
    }

    #[getter]
    pub fn size(&self) -> usize {
        self.index
            .as_ref()
            .map(|index| with_index!(index, index, _E => index.size()))
            .unwrap_or(0)
    }

    #[getter]
    pub fn dtype(&self) -> Option<&'static str> {
        self.index.as_ref().map(AnyIndex::dtype)
    }

    #[getter]
    pub fn speedup(&self) -> Option<f32> {
        self.index
            .as_ref()
            .map(|index| with_index!(index, index, _E => index.speedup()))
    }

    pub fn params(&self) -> PyFlannParameters {
        PyFlannParameters { inner: self.params }
    }
}

impl PyFlannIndex {
    fn require_index(&self) -> PyResult<&AnyIndex> {
        self.index
            .as_ref()
            .ok_or_else(|| PyRuntimeError::new_err("인덱스가 아직 생성되지 않았습니다"))
    }

    fn require_index_mut(&mut self) -> PyResult<&mut AnyIndex> {
        self.index
            .as_mut()
            .ok_or_else(|| PyRuntimeError::new_err("인덱스가 아직 생성되지 않았습니다"))
    }
}
