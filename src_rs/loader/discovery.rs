// 목적:
// - 공유 라이브러리 파일을 디스크에서 찾는다.
//
// 설명:
// - 시작 디렉터리에서 출발해 (파일명 x 후보 디렉터리) 조합을 순서대로 확인하고,
//   없으면 상위 디렉터리로 올라간다.
// - 시작 디렉터리를 포함해 최대 6개 디렉터리까지만 확인하며, 파일시스템 루트에서도 멈춘다.
// - 실패 시 시도한 모든 경로를 오류에 담는다.
//
// 디자인 패턴:
// - 제한 탐색(Bounded Search) + 실패 빠르게(Fail Fast).
//
// 참조:
// - src_rs/loader/platform.rs
// - src_rs/loader/library.rs

use std::path::{Component, Path, PathBuf};

use crate::core::errors::{FlannError, FlannResult};
use crate::loader::platform::Platform;

/// 시작 디렉터리 이후로 올라갈 수 있는 상위 디렉터리 수.
pub const MAX_PARENT_STEPS: usize = 5;

/// 탐색 결과. 찾은 경로와 그때까지 시도한 경로를 함께 보관한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub path: PathBuf,
    pub tried: Vec<PathBuf>,
}

/// 하나의 루트 디렉터리에 대한 후보 디렉터리 목록.
pub fn candidate_dirs(root: &Path) -> Vec<PathBuf> {
    vec![
        root.to_path_buf(),
        root.join("lib"),
        root.join("build"),
        root.join("build").join("lib"),
    ]
}

/// 현재 플랫폼 규칙으로 라이브러리를 찾는다.
pub fn find_library(library_name: &str, root: &Path, recurse: bool) -> FlannResult<Discovery> {
    let platform = Platform::current()?;
    find_library_for(platform, library_name, root, recurse)
}

pub fn find_library_for(
    platform: Platform,
    library_name: &str,
    root: &Path,
    recurse: bool,
) -> FlannResult<Discovery> {
    let file_names = platform.library_file_names(library_name);
    let mut tried = Vec::new();
    let mut current = Some(normalize(root));
    let mut steps = 0usize;

    while let Some(dir) = current.take() {
        for file_name in &file_names {
            for candidate_dir in candidate_dirs(&dir) {
                let candidate = normalize(&candidate_dir.join(file_name));
                tracing::trace!(path = %candidate.display(), "testing library candidate");
                tried.push(candidate.clone());
                if candidate.exists() {
                    tracing::debug!(path = %candidate.display(), "using native library");
                    return Ok(Discovery {
                        path: candidate,
                        tried,
                    });
                }
            }
        }

        if !recurse {
            break;
        }

        steps += 1;
        if steps > MAX_PARENT_STEPS {
            tracing::debug!(steps = MAX_PARENT_STEPS, "not checking after parent limit");
            break;
        }

        current = dir
            .parent()
            .filter(|parent| *parent != dir.as_path() && !parent.as_os_str().is_empty())
            .map(Path::to_path_buf);
    }

    Err(FlannError::LibraryNotFound { tried })
}

/// `.`과 `..`을 어휘적으로 정리한다. 파일시스템은 조회하지 않는다.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}
