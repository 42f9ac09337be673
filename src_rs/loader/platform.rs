// 목적:
// - 플랫폼별 공유 라이브러리 파일명 규칙을 제공한다.
//
// 설명:
// - Windows는 lib<name>.dll, <name>.dll 두 가지를, macOS는 lib<name>.dylib를,
//   Linux 계열은 lib<name>.so를 후보로 사용한다.
// - 알 수 없는 운영체제에서는 추측하지 않고 실패한다.
//
// 참조:
// - src_rs/loader/discovery.rs

use std::env::consts::OS;

use crate::core::errors::{FlannError, FlannResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Elf,
}

impl Platform {
    pub fn current() -> FlannResult<Self> {
        Self::from_os(OS)
    }

    /// `std::env::consts::OS` 값으로 플랫폼을 판별한다.
    pub fn from_os(os: &str) -> FlannResult<Self> {
        match os {
            "windows" => Ok(Self::Windows),
            "macos" | "ios" => Ok(Self::MacOs),
            "linux" | "android" | "freebsd" | "netbsd" | "openbsd" | "dragonfly" | "solaris"
            | "illumos" => Ok(Self::Elf),
            other => Err(FlannError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// 라이브러리 이름에 대한 후보 파일명을 우선순위 순으로 돌려준다.
    pub fn library_file_names(self, library_name: &str) -> Vec<String> {
        match self {
            Self::Windows => vec![
                format!("lib{}.dll", library_name),
                format!("{}.dll", library_name),
            ],
            Self::MacOs => vec![format!("lib{}.dylib", library_name)],
            Self::Elf => vec![format!("lib{}.so", library_name)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_tries_prefixed_name_first() {
        assert_eq!(
            Platform::Windows.library_file_names("flann"),
            vec!["libflann.dll".to_string(), "flann.dll".to_string()]
        );
    }

    #[test]
    fn unknown_os_is_rejected() {
        assert!(matches!(
            Platform::from_os("plan9"),
            Err(FlannError::UnsupportedPlatform(name)) if name == "plan9"
        ));
    }
}
