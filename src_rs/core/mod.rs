// 목적:
// - 바인딩 공통 계층 모듈을 선언한다.
//
// 설명:
// - 오류 모델, 환경 설정, 로깅 초기화를 분리해 다른 계층이 공유한다.
//
// 디자인 패턴:
// - 명시적 오류 모델(Explicit Error Model).
//
// 참조:
// - src_rs/core/errors.rs
// - src_rs/core/config.rs
// - src_rs/core/logging.rs

pub mod config;
pub mod errors;
pub mod logging;
