// 목적:
// - 파라미터 레코드 계층 모듈을 선언한다.
//
// 설명:
// - 기호 옵션 변환과 고정 레이아웃 레코드를 분리한다.
//
// 참조:
// - src_rs/params/options.rs
// - src_rs/params/record.rs

pub mod options;
pub mod record;

pub use options::{Algorithm, CentersInit, DistanceType, LogLevel, SymbolicOption};
pub use record::{FieldKind, FlannParameters, ParamValue, FIELDS};
