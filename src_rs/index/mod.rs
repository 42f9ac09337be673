// 목적:
// - 인덱스/질의 계층 모듈을 선언한다.
//
// 설명:
// - 행렬 검증, 핸들 수명 관리, 핸들 없는 연산을 분리한다.
//
// 디자인 패턴:
// - 모듈 분리(Module Separation).
//
// 참조:
// - src_rs/index/matrix.rs
// - src_rs/index/handle.rs
// - src_rs/index/ops.rs

#[cfg(test)]
mod fake_native;
pub mod handle;
pub mod matrix;
pub mod ops;

pub use handle::{FlannIndex, KnnResult, RadiusResult};
pub use matrix::{Matrix, MatrixRef};
