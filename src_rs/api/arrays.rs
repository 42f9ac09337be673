// 목적:
// - numpy 배열과 내부 행렬 타입 사이의 변환을 담당한다.
//
// 설명:
// - 입력은 C 연속 1차원/2차원 배열만 받는다. 1차원 배열은 1행 행렬로 본다.
// - dtype이 맞지 않으면 None을 돌려 호출자가 다음 타입을 시도하게 한다.
//
// 참조:
// - src_rs/index/matrix.rs
// - src_rs/api/index_bridge.rs

use numpy::ndarray::{Array1, Array2};
use numpy::{Element as NumpyElement, IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;

use crate::api::errors::to_py_err;
use crate::index::matrix::Matrix;
use crate::loader::signatures::Element;

/// 지원하는 dtype 목록. 오류 메시지에 사용한다.
pub const SUPPORTED_DTYPES: &str = "float32, float64, uint8, int32";

/// 배열이 T dtype이면 행렬로 복사한다.
pub fn extract_matrix<'py, T>(object: &Bound<'py, PyAny>) -> Option<PyResult<Matrix<T>>>
where
    T: Element + NumpyElement,
{
    if let Ok(array) = object.extract::<PyReadonlyArray2<'py, T>>() {
        let view = array.as_array();
        let (rows, cols) = view.dim();
        return Some(match view.as_slice() {
            Some(data) => Matrix::new(data.to_vec(), rows, cols).map_err(to_py_err),
            None => Err(not_contiguous()),
        });
    }

    if let Ok(array) = object.extract::<PyReadonlyArray1<'py, T>>() {
        let view = array.as_array();
        let cols = view.len();
        return Some(match view.as_slice() {
            Some(data) => Matrix::new(data.to_vec(), 1, cols).map_err(to_py_err),
            None => Err(not_contiguous()),
        });
    }

    None
}

/// 지정한 dtype으로 행렬을 추출한다. 다른 dtype이면 TypeError다.
pub fn require_matrix<T>(object: &Bound<'_, PyAny>) -> PyResult<Matrix<T>>
where
    T: Element + NumpyElement,
{
    extract_matrix::<T>(object).unwrap_or_else(|| {
        Err(PyTypeError::new_err(format!(
            "인덱스와 같은 dtype({})의 1차원/2차원 배열이 필요합니다",
            <T as Element>::DTYPE
        )))
    })
}

pub fn unsupported_dtype() -> PyErr {
    PyTypeError::new_err(format!(
        "지원하지 않는 배열입니다. 허용 dtype: {}",
        SUPPORTED_DTYPES
    ))
}

fn not_contiguous() -> PyErr {
    PyValueError::new_err("배열은 C 연속(C-contiguous)이어야 합니다")
}

pub fn to_pyarray2<'py, D: NumpyElement>(
    py: Python<'py>,
    data: Vec<D>,
    rows: usize,
    cols: usize,
) -> PyResult<Bound<'py, PyArray2<D>>> {
    let array = Array2::from_shape_vec((rows, cols), data)
        .map_err(|error| PyRuntimeError::new_err(format!("결과 배열 생성 실패: {}", error)))?;
    Ok(array.into_pyarray(py))
}

pub fn to_pyarray1<'py, D: NumpyElement>(py: Python<'py>, data: Vec<D>) -> Bound<'py, PyArray1<D>> {
    Array1::from_vec(data).into_pyarray(py)
}
