// 목적:
// - 공유 라이브러리를 적재하고 호출 규약 테이블을 구성한다.
//
// 설명:
// - libloading으로 라이브러리를 열고 모든 필수 심볼을 즉시 해석한다.
// - 기본 라이브러리는 프로세스당 한 번만 적재해 공유한다.
// - 함수 포인터는 Library가 살아 있는 동안에만 유효하므로 같은 구조체에 함께 보관한다.
//
// 디자인 패턴:
// - 지연 초기화 싱글턴(Lazy Singleton) + 실패 빠르게(Fail Fast).
//
// 참조:
// - src_rs/loader/discovery.rs
// - src_rs/loader/signatures.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use libloading::{Library, Symbol};

use crate::core::config::LibraryConfig;
use crate::core::errors::{FlannError, FlannResult};
use crate::loader::discovery::find_library;
use crate::loader::signatures::{
    Element, ElementApi, NativeApi, LOG_VERBOSITY_SYMBOL, SET_DISTANCE_TYPE_SYMBOL,
};

static GLOBAL_LIBRARY: OnceLock<Arc<FlannLibrary>> = OnceLock::new();

/// 적재된 네이티브 라이브러리와 해석된 함수 포인터 테이블.
pub struct FlannLibrary {
    path: PathBuf,
    api: NativeApi,
    // 함수 포인터가 프로세스 안의 정적 함수를 가리킬 때만 None이다.
    _library: Option<Library>,
}

impl FlannLibrary {
    /// 설정에 따라 라이브러리를 찾아 적재한다.
    pub fn load(config: &LibraryConfig) -> FlannResult<Self> {
        config.validate()?;

        let path = match &config.explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(FlannError::LibraryNotFound {
                        tried: vec![path.clone()],
                    });
                }
                path.clone()
            }
            None => {
                let root = config.resolve_root()?;
                find_library(&config.library_name, &root, config.recurse)?.path
            }
        };

        Self::open(&path)
    }

    /// 주어진 경로의 라이브러리를 적재한다.
    pub fn open(path: &Path) -> FlannResult<Self> {
        // SAFETY: 라이브러리 초기화 코드가 실행된다. FLANN은 전역 생성자 외의 부작용이 없다.
        let library = unsafe { Library::new(path) }.map_err(|error| {
            tracing::warn!(path = %path.display(), %error, "failed to load native library");
            FlannError::LibraryLoad {
                path: path.to_path_buf(),
                reason: error.to_string(),
            }
        })?;

        let api = NativeApi {
            log_verbosity: resolve(&library, LOG_VERBOSITY_SYMBOL)?,
            set_distance_type: resolve(&library, SET_DISTANCE_TYPE_SYMBOL)?,
            float: resolve_element(&library)?,
            double: resolve_element(&library)?,
            byte: resolve_element(&library)?,
            int: resolve_element(&library)?,
        };

        tracing::debug!(path = %path.display(), "native library loaded");
        Ok(Self {
            path: path.to_path_buf(),
            api,
            _library: Some(library),
        })
    }

    /// 이미 구성된 호출 규약 테이블로 라이브러리 값을 만든다. 테이블의 함수는 정적이어야 한다.
    #[cfg(test)]
    pub(crate) fn from_api(path: PathBuf, api: NativeApi) -> Self {
        Self {
            path,
            api,
            _library: None,
        }
    }

    /// 프로세스 전역 라이브러리를 돌려준다. 최초 호출 시 환경 설정으로 적재한다.
    pub fn global() -> FlannResult<Arc<Self>> {
        if let Some(library) = GLOBAL_LIBRARY.get() {
            return Ok(library.clone());
        }

        let loaded = Arc::new(Self::load(&LibraryConfig::from_env())?);
        Ok(GLOBAL_LIBRARY.get_or_init(|| loaded).clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn api(&self) -> &NativeApi {
        &self.api
    }

    pub fn element_api<T: Element>(&self) -> &ElementApi<T> {
        T::api(&self.api)
    }
}

impl fmt::Debug for FlannLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlannLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn resolve<F: Copy>(library: &Library, symbol: &str) -> FlannResult<F> {
    // SAFETY: F는 signatures.rs에 선언된 C 함수 포인터 타입이며 심볼의 실제 시그니처와 같다.
    let resolved: Symbol<'_, F> = unsafe { library.get(symbol.as_bytes()) }.map_err(|error| {
        FlannError::MissingSymbol {
            symbol: symbol.to_string(),
            reason: error.to_string(),
        }
    })?;
    Ok(*resolved)
}

fn resolve_element<T: Element>(library: &Library) -> FlannResult<ElementApi<T>> {
    let [
        build_index,
        add_points,
        save_index,
        load_index,
        find_nearest_neighbors,
        find_nearest_neighbors_index,
        radius_search,
        compute_cluster_centers,
        free_index,
    ] = ElementApi::<T>::symbols();

    Ok(ElementApi {
        build_index: resolve(library, &build_index)?,
        add_points: resolve(library, &add_points)?,
        save_index: resolve(library, &save_index)?,
        load_index: resolve(library, &load_index)?,
        find_nearest_neighbors: resolve(library, &find_nearest_neighbors)?,
        find_nearest_neighbors_index: resolve(library, &find_nearest_neighbors_index)?,
        radius_search: resolve(library, &radius_search)?,
        compute_cluster_centers: resolve(library, &compute_cluster_centers)?,
        free_index: resolve(library, &free_index)?,
    })
}
