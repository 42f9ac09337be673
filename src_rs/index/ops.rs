// 목적:
// - 인덱스 핸들 없이 호출하는 네이티브 연산을 제공한다.
//
// 설명:
// - 원시 데이터셋에 대한 일회성 k-NN 질의, 계층 k-means 클러스터 중심 계산,
//   전역 로그 수준/거리 종류 설정을 다룬다.
//
// 참조:
// - src_rs/loader/signatures.rs
// - src_rs/index/handle.rs

use crate::core::errors::{check_status, FlannError, FlannResult};
use crate::index::handle::KnnResult;
use crate::index::matrix::{to_c_dim, Matrix, MatrixRef};
use crate::loader::library::FlannLibrary;
use crate::loader::signatures::{Element, Operation};
use crate::params::options::{DistanceType, LogLevel, SymbolicOption};
use crate::params::record::FlannParameters;

/// 계층 k-means의 최소 분기 계수. 클러스터 수도 이 값 이상이어야 한다.
pub const MIN_CLUSTERS: usize = 2;

/// 인덱스를 만들지 않고 데이터셋 전체에 대해 k-NN 질의를 수행한다.
pub fn find_nearest_neighbors<T: Element>(
    library: &FlannLibrary,
    dataset: MatrixRef<'_, T>,
    testset: MatrixRef<'_, T>,
    nn: usize,
    params: &FlannParameters,
) -> FlannResult<KnnResult<T::Dist>> {
    if dataset.cols() != testset.cols() {
        return Err(FlannError::InvalidInput(format!(
            "데이터셋과 질의의 차원이 다릅니다: {} != {}",
            dataset.cols(),
            testset.cols()
        )));
    }

    if nn == 0 || nn > dataset.rows() {
        return Err(FlannError::InvalidInput(format!(
            "nn은 1 이상 {} 이하여야 합니다: {}",
            dataset.rows(),
            nn
        )));
    }

    let rows = to_c_dim(dataset.rows(), "rows")?;
    let cols = to_c_dim(dataset.cols(), "cols")?;
    let tcount = to_c_dim(testset.rows(), "tcount")?;
    let nn_c = to_c_dim(nn, "nn")?;
    let total = testset.rows() * nn;
    let mut indices = vec![0i32; total];
    let mut dists = vec![T::Dist::default(); total];
    let mut params = *params;

    let find = library.element_api::<T>().find_nearest_neighbors;
    // SAFETY: 모든 버퍼 길이는 위에서 검증한 형상과 일치한다.
    let status = unsafe {
        find(
            dataset.as_ptr(),
            rows,
            cols,
            testset.as_ptr(),
            tcount,
            indices.as_mut_ptr(),
            dists.as_mut_ptr(),
            nn_c,
            &mut params,
        )
    };
    check_status(status, &Operation::FindNearestNeighbors.symbol_for::<T>())?;

    Ok(KnnResult {
        indices,
        dists,
        rows: testset.rows(),
        nn,
    })
}

/// 계층 k-means로 최대 `clusters`개의 클러스터 중심을 계산한다.
///
/// 네이티브 계층은 분기 계수에 맞는 개수만 돌려줄 수 있으므로 결과 행 수는 반환값을 따른다.
/// `clusters`와 `params.branching`은 모두 2 이상이어야 한다.
pub fn compute_cluster_centers<T: Element>(
    library: &FlannLibrary,
    dataset: MatrixRef<'_, T>,
    clusters: usize,
    params: &FlannParameters,
) -> FlannResult<Matrix<T::Dist>> {
    if clusters < MIN_CLUSTERS || clusters > dataset.rows() {
        return Err(FlannError::InvalidInput(format!(
            "clusters는 {} 이상 {} 이하여야 합니다: {}",
            MIN_CLUSTERS,
            dataset.rows(),
            clusters
        )));
    }

    if params.branching < MIN_CLUSTERS as i32 {
        return Err(FlannError::InvalidInput(format!(
            "branching은 {} 이상이어야 합니다: {}",
            MIN_CLUSTERS, params.branching
        )));
    }

    let rows = to_c_dim(dataset.rows(), "rows")?;
    let cols = to_c_dim(dataset.cols(), "cols")?;
    let clusters_c = to_c_dim(clusters, "clusters")?;
    let mut result = vec![T::Dist::default(); clusters * dataset.cols()];
    let mut params = *params;

    let compute = library.element_api::<T>().compute_cluster_centers;
    // SAFETY: result는 clusters*cols 길이다.
    let status = unsafe {
        compute(
            dataset.as_ptr(),
            rows,
            cols,
            clusters_c,
            result.as_mut_ptr(),
            &mut params,
        )
    };
    let computed = check_status(status, &Operation::ComputeClusterCenters.symbol_for::<T>())?
        as usize;

    if computed == 0 {
        return Err(FlannError::Native {
            operation: Operation::ComputeClusterCenters.symbol_for::<T>(),
            code: 0,
        });
    }

    let computed = computed.min(clusters);
    result.truncate(computed * dataset.cols());
    Matrix::new(result, computed, dataset.cols())
}

/// 네이티브 라이브러리의 전역 로그 수준을 설정한다.
pub fn set_log_verbosity(library: &FlannLibrary, level: LogLevel) {
    let log_verbosity = library.api().log_verbosity;
    // SAFETY: 인자는 정수 하나이며 부작용은 전역 로그 수준 변경뿐이다.
    unsafe { log_verbosity(level.code()) };
}

/// 이후 생성되는 인덱스가 사용할 거리 종류를 설정한다. `order`는 Minkowski 차수다.
pub fn set_distance_type(library: &FlannLibrary, distance: DistanceType, order: i32) {
    let set_distance_type = library.api().set_distance_type;
    // SAFETY: 정수 인자 두 개만 전달한다.
    unsafe { set_distance_type(distance.code(), order) };
    tracing::debug!(%distance, order, "distance type set");
}
