// 목적:
// - Python FFI 경계 모듈을 선언한다.
//
// 설명:
// - 파라미터/인덱스 클래스와 모듈 함수를 분리해 Python 계층에서 사용할 수 있게 한다.
// - `python` 기능이 켜졌을 때만 컴파일된다.
//
// 디자인 패턴:
// - 모듈 분리(Module Separation).
//
// 참조:
// - src_rs/api/params_bridge.rs
// - src_rs/api/index_bridge.rs
// - src_rs/api/functions.rs

pub mod arrays;
pub mod errors;
pub mod functions;
pub mod index_bridge;
pub mod params_bridge;
