// 목적:
// - 네이티브 라이브러리 탐색 설정을 정의한다.
//
// 설명:
// - 라이브러리 이름, 탐색 시작 디렉터리, 상위 디렉터리 재귀 여부,
//   명시적 경로를 하나의 설정으로 묶는다.
// - 환경 변수(FLANN_LIBRARY_PATH, FLANN_ROOT, FLANN_LIBRARY_NAME, FLANN_NO_RECURSE)로
//   기본값을 덮어쓸 수 있다.
//
// 디자인 패턴:
// - 설정 객체(Configuration Object).
//
// 참조:
// - src_rs/loader/discovery.rs
// - src_rs/loader/library.rs

use std::env;
use std::path::PathBuf;

use crate::core::errors::{FlannError, FlannResult};
use crate::loader::module_path::module_dir;

pub const DEFAULT_LIBRARY_NAME: &str = "flann";

pub const ENV_LIBRARY_PATH: &str = "FLANN_LIBRARY_PATH";
pub const ENV_ROOT: &str = "FLANN_ROOT";
pub const ENV_LIBRARY_NAME: &str = "FLANN_LIBRARY_NAME";
pub const ENV_NO_RECURSE: &str = "FLANN_NO_RECURSE";

/// 라이브러리 탐색 설정이다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    pub library_name: String,
    pub root_dir: Option<PathBuf>,
    pub recurse: bool,
    pub explicit_path: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            root_dir: None,
            recurse: true,
            explicit_path: None,
        }
    }
}

impl LibraryConfig {
    /// 프로세스 환경 변수로부터 설정을 만든다.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 조회 함수로부터 설정을 만든다. 빈 값은 설정되지 않은 것으로 본다.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(name) = read(ENV_LIBRARY_NAME) {
            config.library_name = name.trim().to_string();
        }
        config.root_dir = read(ENV_ROOT).map(PathBuf::from);
        config.explicit_path = read(ENV_LIBRARY_PATH).map(PathBuf::from);
        if let Some(flag) = read(ENV_NO_RECURSE) {
            config.recurse = !matches!(flag.trim(), "1" | "true" | "yes");
        }

        config
    }

    /// 탐색 시작 디렉터리를 결정한다.
    ///
    /// 지정되지 않았다면 이 크레이트를 담은 모듈(확장 모듈 .so/.pyd 또는 실행 파일)의
    /// 디렉터리를 사용하고, 그 위치를 알 수 없을 때만 실행 파일 디렉터리로 물러난다.
    pub fn resolve_root(&self) -> FlannResult<PathBuf> {
        if let Some(root) = &self.root_dir {
            return Ok(root.clone());
        }

        if let Some(dir) = module_dir() {
            return Ok(dir);
        }

        let exe = env::current_exe().map_err(|error| {
            FlannError::InvalidInput(format!("실행 파일 경로 확인 실패: {}", error))
        })?;
        let exe = exe.canonicalize().unwrap_or(exe);
        exe.parent().map(|dir| dir.to_path_buf()).ok_or_else(|| {
            FlannError::InvalidInput(format!(
                "실행 파일의 상위 디렉터리가 없습니다: {}",
                exe.display()
            ))
        })
    }

    pub fn validate(&self) -> FlannResult<()> {
        let name = self.library_name.trim();
        if name.is_empty() {
            return Err(FlannError::InvalidInput(
                "library_name은 비어 있을 수 없습니다".to_string(),
            ));
        }

        if name.contains(['/', '\\']) {
            return Err(FlannError::InvalidInput(format!(
                "library_name에는 경로 구분자를 사용할 수 없습니다: {}",
                name
            )));
        }

        Ok(())
    }
}
