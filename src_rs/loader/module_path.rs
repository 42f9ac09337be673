// 목적:
// - 이 크레이트 코드가 들어 있는 실행 이미지(확장 모듈 또는 실행 파일)의 위치를 찾는다.
//
// 설명:
// - Python 확장 모듈로 적재되면 실행 파일은 인터프리터이므로 current_exe로는 설치 위치를 알 수 없다.
// - 크레이트 안의 함수 주소를 운영체제 로더에 물어 그 주소를 담은 이미지 파일 경로를 얻는다.
//   unix는 dladdr, Windows는 GetModuleHandleExW + GetModuleFileNameW를 사용한다.
// - rlib로 정적 링크된 경우에는 실행 파일 경로가 돌아온다.
//
// 참조:
// - src_rs/core/config.rs

use std::path::PathBuf;

/// 이 코드를 담은 이미지 파일 경로. 로더가 알려 주지 않으면 None이다.
pub fn module_path() -> Option<PathBuf> {
    image_path().filter(|path| !path.as_os_str().is_empty())
}

/// 이미지 파일이 위치한 디렉터리.
pub fn module_dir() -> Option<PathBuf> {
    let path = module_path()?;
    let path = path.canonicalize().unwrap_or(path);
    path.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.to_path_buf())
}

#[cfg(unix)]
fn image_path() -> Option<PathBuf> {
    use std::ffi::{CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;

    let anchor: fn() -> Option<PathBuf> = image_path;
    // SAFETY: Dl_info는 포인터 필드만 가지므로 0으로 채운 값이 유효하다.
    let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
    // SAFETY: anchor는 현재 적재된 이미지 안의 코드 주소다.
    let found = unsafe { libc::dladdr(anchor as *const libc::c_void, &mut info) };
    if found == 0 || info.dli_fname.is_null() {
        tracing::debug!("dladdr could not resolve the module image");
        return None;
    }

    // SAFETY: dli_fname은 로더가 소유한 NUL 종료 문자열이다.
    let name = unsafe { CStr::from_ptr(info.dli_fname) };
    Some(PathBuf::from(OsStr::from_bytes(name.to_bytes())))
}

#[cfg(windows)]
fn image_path() -> Option<PathBuf> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;

    use windows_sys::Win32::Foundation::HMODULE;
    use windows_sys::Win32::System::LibraryLoader::{
        GetModuleFileNameW, GetModuleHandleExW, GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS,
        GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
    };

    const MAX_WIDE_PATH: usize = 32_768;

    let anchor: fn() -> Option<PathBuf> = image_path;
    let mut module: HMODULE = std::ptr::null_mut();
    let flags =
        GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS | GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT;
    // SAFETY: FROM_ADDRESS 플래그에서는 두 번째 인자를 모듈 내부 주소로 해석한다.
    let ok = unsafe { GetModuleHandleExW(flags, anchor as *const u16, &mut module) };
    if ok == 0 {
        tracing::debug!("GetModuleHandleExW could not resolve the module image");
        return None;
    }

    let mut buffer = vec![0u16; 260];
    loop {
        // SAFETY: buffer 길이를 그대로 전달한다.
        let written =
            unsafe { GetModuleFileNameW(module, buffer.as_mut_ptr(), buffer.len() as u32) }
                as usize;
        if written == 0 {
            return None;
        }
        if written < buffer.len() {
            buffer.truncate(written);
            break;
        }
        if buffer.len() >= MAX_WIDE_PATH {
            return None;
        }
        buffer.resize(buffer.len() * 2, 0);
    }

    Some(PathBuf::from(OsString::from_wide(&buffer)))
}

#[cfg(not(any(unix, windows)))]
fn image_path() -> Option<PathBuf> {
    None
}
