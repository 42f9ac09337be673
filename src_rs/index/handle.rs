// 목적:
// - 네이티브 인덱스 핸들의 수명을 관리한다.
//
// 설명:
// - 네이티브 인덱스는 데이터셋을 복사하지 않고 포인터로 참조한다.
//   따라서 기준 데이터와 추가된 점 버퍼를 모두 인덱스가 소유해 핸들보다 오래 살게 한다.
// - Drop 시 flann_free_index_<type>로 핸들을 해제한다.
//
// 디자인 패턴:
// - RAII 소유 핸들(Owned Handle).
//
// 참조:
// - src_rs/loader/signatures.rs
// - src_rs/index/matrix.rs

use std::ffi::CString;
use std::fmt;
use std::os::raw::{c_float, c_void};
use std::path::Path;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::core::errors::{check_status, FlannError, FlannResult};
use crate::index::matrix::{to_c_dim, Matrix, MatrixRef};
use crate::loader::library::FlannLibrary;
use crate::loader::signatures::{Element, ElementApi, Operation};
use crate::params::record::FlannParameters;

/// k-최근접 이웃 질의 결과. 두 버퍼 모두 [rows x nn] 행 우선 배열이다.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnResult<D> {
    pub indices: Vec<i32>,
    pub dists: Vec<D>,
    pub rows: usize,
    pub nn: usize,
}

impl<D: Copy> KnnResult<D> {
    pub fn row(&self, index: usize) -> Option<(&[i32], &[D])> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.nn;
        let end = start + self.nn;
        Some((&self.indices[start..end], &self.dists[start..end]))
    }
}

/// 반경 질의 결과. 실제로 찾은 개수만큼만 담는다.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusResult<D> {
    pub indices: Vec<i32>,
    pub dists: Vec<D>,
}

impl<D> RadiusResult<D> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// 네이티브 인덱스 소유자.
pub struct FlannIndex<T: Element> {
    library: Arc<FlannLibrary>,
    handle: NonNull<c_void>,
    params: FlannParameters,
    datasets: Vec<Matrix<T>>,
    cols: usize,
    speedup: f32,
}

// SAFETY: 핸들은 이 값만 소유하며, 동시 접근은 &mut/소유권 규칙으로 막는다.
unsafe impl<T: Element> Send for FlannIndex<T> {}

impl<T: Element> FlannIndex<T> {
    /// 데이터셋으로 인덱스를 생성한다.
    ///
    /// 네이티브 계층이 자동 튜닝 등으로 결정한 파라미터는 `params()`로 다시 읽을 수 있다.
    pub fn build(
        library: Arc<FlannLibrary>,
        dataset: Matrix<T>,
        params: FlannParameters,
    ) -> FlannResult<Self> {
        let rows = to_c_dim(dataset.rows(), "rows")?;
        let cols = to_c_dim(dataset.cols(), "cols")?;
        let mut params = params;
        let mut speedup: c_float = 0.0;

        let build_index = library.element_api::<T>().build_index;
        // SAFETY: dataset은 rows*cols 길이의 연속 버퍼이며 반환된 인덱스보다 오래 산다.
        let raw = unsafe { build_index(dataset.as_ptr(), rows, cols, &mut speedup, &mut params) };
        let handle = non_null(raw, Operation::BuildIndex.symbol_for::<T>())?;

        tracing::debug!(
            dtype = T::DTYPE,
            rows = dataset.rows(),
            cols = dataset.cols(),
            speedup,
            "index built"
        );

        Ok(Self {
            library,
            handle,
            params,
            cols: dataset.cols(),
            datasets: vec![dataset],
            speedup,
        })
    }

    /// 저장된 인덱스 파일과 원본 데이터셋으로 인덱스를 복원한다.
    pub fn load(
        library: Arc<FlannLibrary>,
        path: &Path,
        dataset: Matrix<T>,
        params: FlannParameters,
    ) -> FlannResult<Self> {
        let filename = path_to_cstring(path)?;
        let rows = to_c_dim(dataset.rows(), "rows")?;
        let cols = to_c_dim(dataset.cols(), "cols")?;

        let load_index = library.element_api::<T>().load_index;
        // SAFETY: filename은 NUL 종료 문자열이고 dataset은 인덱스보다 오래 산다.
        let raw = unsafe { load_index(filename.as_ptr(), dataset.as_ptr(), rows, cols) };
        let handle = non_null(raw, Operation::LoadIndex.symbol_for::<T>())?;

        tracing::debug!(dtype = T::DTYPE, path = %path.display(), "index loaded");

        Ok(Self {
            library,
            handle,
            params,
            cols: dataset.cols(),
            datasets: vec![dataset],
            speedup: 0.0,
        })
    }

    fn api(&self) -> &ElementApi<T> {
        self.library.element_api::<T>()
    }

    pub fn params(&self) -> &FlannParameters {
        &self.params
    }

    /// 질의 시 사용할 파라미터(checks, eps, sorted 등)를 교체한다.
    pub fn set_params(&mut self, params: FlannParameters) {
        self.params = params;
    }

    pub fn speedup(&self) -> f32 {
        self.speedup
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// 인덱스에 포함된 전체 점 수.
    pub fn size(&self) -> usize {
        self.datasets.iter().map(Matrix::rows).sum()
    }

    pub fn library(&self) -> &Arc<FlannLibrary> {
        &self.library
    }

    /// 점을 추가한다. 추가된 버퍼는 인덱스가 해제될 때까지 보관한다.
    pub fn add_points(&mut self, points: Matrix<T>, rebuild_threshold: f32) -> FlannResult<()> {
        self.ensure_cols(points.cols(), "points")?;
        let rows = to_c_dim(points.rows(), "rows")?;
        let cols = to_c_dim(points.cols(), "cols")?;

        let add_points = self.api().add_points;
        // SAFETY: handle은 유효하며 points 버퍼는 self.datasets로 옮겨져 핸들보다 오래 산다.
        let status =
            unsafe { add_points(self.handle.as_ptr(), points.as_ptr(), rows, cols, rebuild_threshold) };
        check_status(status, &Operation::AddPoints.symbol_for::<T>())?;

        self.datasets.push(points);
        Ok(())
    }

    pub fn save(&self, path: &Path) -> FlannResult<()> {
        let filename = path_to_cstring(path)?;
        let save_index = self.api().save_index;
        // SAFETY: handle은 유효하고 filename은 NUL 종료 문자열이다.
        let status = unsafe { save_index(self.handle.as_ptr(), filename.as_ptr()) };
        check_status(status, &Operation::SaveIndex.symbol_for::<T>())?;
        Ok(())
    }

    /// 질의 행마다 nn개의 최근접 이웃을 찾는다.
    pub fn knn_search(&self, queries: MatrixRef<'_, T>, nn: usize) -> FlannResult<KnnResult<T::Dist>> {
        self.ensure_cols(queries.cols(), "queries")?;
        if nn == 0 || nn > self.size() {
            return Err(FlannError::InvalidInput(format!(
                "nn은 1 이상 {} 이하여야 합니다: {}",
                self.size(),
                nn
            )));
        }

        let tcount = to_c_dim(queries.rows(), "tcount")?;
        let nn_c = to_c_dim(nn, "nn")?;
        let total = queries.rows() * nn;
        let mut indices = vec![0i32; total];
        let mut dists = vec![T::Dist::default(); total];
        let mut params = self.params;

        let find = self.api().find_nearest_neighbors_index;
        // SAFETY: 출력 버퍼는 tcount*nn 길이이고 질의 버퍼는 tcount*cols 길이다.
        let status = unsafe {
            find(
                self.handle.as_ptr(),
                queries.as_ptr(),
                tcount,
                indices.as_mut_ptr(),
                dists.as_mut_ptr(),
                nn_c,
                &mut params,
            )
        };
        check_status(status, &Operation::FindNearestNeighborsIndex.symbol_for::<T>())?;

        Ok(KnnResult {
            indices,
            dists,
            rows: queries.rows(),
            nn,
        })
    }

    /// 반경 안의 이웃을 최대 max_nn개까지 찾는다.
    pub fn radius_search(
        &self,
        query: &[T],
        max_nn: usize,
        radius: f32,
    ) -> FlannResult<RadiusResult<T::Dist>> {
        self.ensure_cols(query.len(), "query")?;
        if max_nn == 0 {
            return Err(FlannError::InvalidInput(
                "max_nn은 1 이상이어야 합니다".to_string(),
            ));
        }

        let max_nn_c = to_c_dim(max_nn, "max_nn")?;
        let mut indices = vec![0i32; max_nn];
        let mut dists = vec![T::Dist::default(); max_nn];
        let mut params = self.params;

        let radius_search = self.api().radius_search;
        // SAFETY: 출력 버퍼는 max_nn 길이이고 query는 cols 길이다.
        let status = unsafe {
            radius_search(
                self.handle.as_ptr(),
                query.as_ptr(),
                indices.as_mut_ptr(),
                dists.as_mut_ptr(),
                max_nn_c,
                radius,
                &mut params,
            )
        };
        let found = check_status(status, &Operation::RadiusSearch.symbol_for::<T>())? as usize;

        let found = found.min(max_nn);
        indices.truncate(found);
        dists.truncate(found);
        Ok(RadiusResult { indices, dists })
    }

    fn ensure_cols(&self, cols: usize, field_name: &str) -> FlannResult<()> {
        if cols != self.cols {
            return Err(FlannError::InvalidInput(format!(
                "{}의 차원이 인덱스와 다릅니다: {} != {}",
                field_name, cols, self.cols
            )));
        }
        Ok(())
    }
}

impl<T: Element> Drop for FlannIndex<T> {
    fn drop(&mut self) {
        let free_index = self.api().free_index;
        let mut params = self.params;
        // SAFETY: handle은 build/load에서 받은 뒤 한 번만 해제된다.
        let status = unsafe { free_index(self.handle.as_ptr(), &mut params) };
        if status < 0 {
            tracing::warn!(dtype = T::DTYPE, status, "failed to free native index");
        }
    }
}

impl<T: Element> fmt::Debug for FlannIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlannIndex")
            .field("dtype", &T::DTYPE)
            .field("size", &self.size())
            .field("cols", &self.cols)
            .field("speedup", &self.speedup)
            .finish_non_exhaustive()
    }
}

fn non_null(raw: *mut c_void, operation: String) -> FlannResult<NonNull<c_void>> {
    NonNull::new(raw).ok_or(FlannError::Native { operation, code: -1 })
}

fn path_to_cstring(path: &Path) -> FlannResult<CString> {
    let text = path.to_str().ok_or_else(|| {
        FlannError::InvalidInput(format!("UTF-8이 아닌 경로입니다: {}", path.display()))
    })?;
    CString::new(text).map_err(|_| {
        FlannError::InvalidInput(format!("경로에 NUL 문자가 있습니다: {}", text))
    })
}
