// 목적:
// - 도메인 오류를 Python 예외로 변환한다.
//
// 설명:
// - 라이브러리 탐색/적재 실패는 ImportError, 입력 오류는 ValueError,
//   존재하지 않는 파라미터는 KeyError, 나머지는 RuntimeError로 전달한다.
//
// 참조:
// - src_rs/core/errors.rs

use pyo3::exceptions::{PyImportError, PyKeyError, PyRuntimeError, PyValueError};
use pyo3::PyErr;

use crate::core::errors::FlannError;

pub fn to_py_err(error: FlannError) -> PyErr {
    let message = error.to_string();
    match error {
        FlannError::LibraryNotFound { .. }
        | FlannError::LibraryLoad { .. }
        | FlannError::MissingSymbol { .. }
        | FlannError::UnsupportedPlatform(_) => PyImportError::new_err(message),
        FlannError::UnknownParameter(key) => PyKeyError::new_err(key),
        FlannError::InvalidParameter(_) | FlannError::InvalidInput(_) => {
            PyValueError::new_err(message)
        }
        FlannError::Native { .. } | FlannError::Serialization(_) => PyRuntimeError::new_err(message),
    }
}
