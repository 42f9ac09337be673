// 목적:
// - 네이티브 라이브러리 적재 계층 모듈을 선언한다.
//
// 설명:
// - 플랫폼 파일명 규칙, 디스크 탐색, 호출 규약 선언, 실제 적재를 분리한다.
//
// 디자인 패턴:
// - 모듈 분리(Module Separation).
//
// 참조:
// - src_rs/loader/discovery.rs
// - src_rs/loader/library.rs

pub mod discovery;
pub mod library;
pub mod module_path;
pub mod platform;
pub mod signatures;

pub use library::FlannLibrary;
pub use signatures::Element;
