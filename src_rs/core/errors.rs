// 목적:
// - 바인딩 계층의 표준 오류 타입을 정의한다.
//
// 설명:
// - 라이브러리 탐색/적재 실패, 파라미터 변환 실패, 입력 형상 오류,
//   네이티브 호출 실패를 명시적으로 구분해 호출자(Rust/Python)에 전달한다.
// - 재시도나 부분 실패 처리는 하지 않는다. 실패는 즉시 반환한다.
//
// 디자인 패턴:
// - 도메인 오류 열거형(Domain Error Enum).
//
// 참조:
// - src_rs/loader/discovery.rs
// - src_rs/loader/library.rs
// - src_rs/api/errors.rs

use std::path::PathBuf;

use thiserror::Error;

/// 바인딩 전 계층에서 공통으로 사용하는 오류 열거형이다.
#[derive(Debug, Error)]
pub enum FlannError {
    #[error("동적 라이브러리를 찾을 수 없습니다. 시도한 경로:\n * {}", join_paths(.tried))]
    LibraryNotFound { tried: Vec<PathBuf> },
    #[error("동적 라이브러리 적재에 실패했습니다({}): {reason}. FLANN을 컴파일했는지 확인하세요", .path.display())]
    LibraryLoad { path: PathBuf, reason: String },
    #[error("네이티브 심볼을 찾을 수 없습니다({symbol}): {reason}")]
    MissingSymbol { symbol: String, reason: String },
    #[error("지원하지 않는 운영체제입니다: {0}")]
    UnsupportedPlatform(String),
    #[error("존재하지 않는 파라미터입니다: {0}")]
    UnknownParameter(String),
    #[error("파라미터 값이 유효하지 않습니다: {0}")]
    InvalidParameter(String),
    #[error("입력값이 유효하지 않습니다: {0}")]
    InvalidInput(String),
    #[error("네이티브 호출이 실패했습니다({operation}): 반환 코드 {code}")]
    Native { operation: String, code: i32 },
    #[error("직렬화/역직렬화에 실패했습니다: {0}")]
    Serialization(String),
}

pub type FlannResult<T> = Result<T, FlannError>;

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join("\n * ")
}

/// 네이티브 상태 코드를 검사한다. 음수는 실패로 간주한다.
pub fn check_status(code: i32, operation: &str) -> FlannResult<i32> {
    if code < 0 {
        return Err(FlannError::Native {
            operation: operation.to_string(),
            code,
        });
    }
    Ok(code)
}
