#![allow(non_local_definitions)]

// 목적:
// - FLANN 네이티브 라이브러리 브릿지의 진입점을 제공한다.
//
// 설명:
// - 검색 알고리즘은 구현하지 않는다. 고정 레이아웃 파라미터 레코드, 공유 라이브러리 탐색,
//   원소 타입별 호출 규약 테이블을 선언하고 Rust/Python 호출자에게 다시 노출한다.
// - Python 확장 모듈은 `python` 기능을 켰을 때만 포함된다.
//
// 디자인 패턴:
// - 계층형 모듈 구조(api/core/index/loader/params).
//
// 참조:
// - src_rs/loader/library.rs
// - src_rs/api/index_bridge.rs

#[cfg(feature = "python")]
pub mod api;
pub mod core;
pub mod index;
pub mod loader;
pub mod params;

pub use crate::core::config::LibraryConfig;
pub use crate::core::errors::{FlannError, FlannResult};
pub use crate::index::{FlannIndex, KnnResult, Matrix, MatrixRef, RadiusResult};
pub use crate::loader::{Element, FlannLibrary};
pub use crate::params::{Algorithm, CentersInit, DistanceType, FlannParameters, LogLevel, ParamValue};

#[cfg(feature = "python")]
mod python_module {
    use pyo3::prelude::*;
    use pyo3::types::PyModule;

    use crate::api::functions::{
        init_logging, kmeans_centers, library_path, log_verbosity, nn, parameter_keys,
        set_distance_type,
    };
    use crate::api::index_bridge::PyFlannIndex;
    use crate::api::params_bridge::PyFlannParameters;

    #[pymodule]
    fn _flann_bridge(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<PyFlannParameters>()?;
        m.add_class::<PyFlannIndex>()?;
        m.add_function(wrap_pyfunction!(nn, m)?)?;
        m.add_function(wrap_pyfunction!(kmeans_centers, m)?)?;
        m.add_function(wrap_pyfunction!(set_distance_type, m)?)?;
        m.add_function(wrap_pyfunction!(log_verbosity, m)?)?;
        m.add_function(wrap_pyfunction!(library_path, m)?)?;
        m.add_function(wrap_pyfunction!(parameter_keys, m)?)?;
        m.add_function(wrap_pyfunction!(init_logging, m)?)?;
        Ok(())
    }
}
