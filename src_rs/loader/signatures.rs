// 목적:
// - 네이티브 진입점의 호출 규약(인자/반환 타입)을 선언한다.
//
// 설명:
// - 원소 타입(float32/float64/uint8/int32)마다 같은 연산 집합이 접미사만 바꿔 노출된다.
// - 거리 버퍼 타입은 float64 데이터만 double이고 나머지는 float이다.
// - 입력 버퍼는 조밀하고 연속적이며 자연 정렬된 행 우선 배열이어야 한다.
//
// 디자인 패턴:
// - 타입 기반 디스패치 테이블(Type-Directed Dispatch Table).
//
// 참조:
// - src_rs/loader/library.rs
// - src_rs/index/handle.rs

use std::os::raw::{c_char, c_float, c_int, c_void};

use crate::params::record::FlannParameters;

/// 네이티브 인덱스를 가리키는 불투명 핸들.
pub type IndexHandle = *mut c_void;

pub type LogVerbosityFn = unsafe extern "C" fn(level: c_int);
pub type SetDistanceTypeFn = unsafe extern "C" fn(distance_type: c_int, order: c_int);

pub type BuildIndexFn<T> = unsafe extern "C" fn(
    dataset: *const T,
    rows: c_int,
    cols: c_int,
    speedup: *mut c_float,
    params: *mut FlannParameters,
) -> IndexHandle;

pub type AddPointsFn<T> = unsafe extern "C" fn(
    index: IndexHandle,
    points: *const T,
    rows: c_int,
    cols: c_int,
    rebuild_threshold: c_float,
) -> c_int;

pub type SaveIndexFn = unsafe extern "C" fn(index: IndexHandle, filename: *const c_char) -> c_int;

pub type LoadIndexFn<T> = unsafe extern "C" fn(
    filename: *const c_char,
    dataset: *const T,
    rows: c_int,
    cols: c_int,
) -> IndexHandle;

pub type FindNearestNeighborsFn<T, D> = unsafe extern "C" fn(
    dataset: *const T,
    rows: c_int,
    cols: c_int,
    testset: *const T,
    tcount: c_int,
    result: *mut c_int,
    dists: *mut D,
    nn: c_int,
    params: *mut FlannParameters,
) -> c_int;

pub type FindNearestNeighborsIndexFn<T, D> = unsafe extern "C" fn(
    index: IndexHandle,
    testset: *const T,
    tcount: c_int,
    result: *mut c_int,
    dists: *mut D,
    nn: c_int,
    params: *mut FlannParameters,
) -> c_int;

pub type RadiusSearchFn<T, D> = unsafe extern "C" fn(
    index: IndexHandle,
    query: *const T,
    indices: *mut c_int,
    dists: *mut D,
    max_nn: c_int,
    radius: c_float,
    params: *mut FlannParameters,
) -> c_int;

pub type ComputeClusterCentersFn<T, D> = unsafe extern "C" fn(
    dataset: *const T,
    rows: c_int,
    cols: c_int,
    clusters: c_int,
    result: *mut D,
    params: *mut FlannParameters,
) -> c_int;

pub type FreeIndexFn = unsafe extern "C" fn(index: IndexHandle, params: *mut FlannParameters) -> c_int;

/// 원소 타입별로 노출되는 네이티브 연산.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    BuildIndex,
    AddPoints,
    SaveIndex,
    LoadIndex,
    FindNearestNeighbors,
    FindNearestNeighborsIndex,
    RadiusSearch,
    ComputeClusterCenters,
    FreeIndex,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Self::BuildIndex,
        Self::AddPoints,
        Self::SaveIndex,
        Self::LoadIndex,
        Self::FindNearestNeighbors,
        Self::FindNearestNeighborsIndex,
        Self::RadiusSearch,
        Self::ComputeClusterCenters,
        Self::FreeIndex,
    ];

    pub fn base_name(self) -> &'static str {
        match self {
            Self::BuildIndex => "flann_build_index",
            Self::AddPoints => "flann_add_points",
            Self::SaveIndex => "flann_save_index",
            Self::LoadIndex => "flann_load_index",
            Self::FindNearestNeighbors => "flann_find_nearest_neighbors",
            Self::FindNearestNeighborsIndex => "flann_find_nearest_neighbors_index",
            Self::RadiusSearch => "flann_radius_search",
            Self::ComputeClusterCenters => "flann_compute_cluster_centers",
            Self::FreeIndex => "flann_free_index",
        }
    }

    pub fn symbol_for<T: Element>(self) -> String {
        self.symbol(T::SUFFIX)
    }

    pub fn symbol(self, suffix: &str) -> String {
        format!("{}_{}", self.base_name(), suffix)
    }
}

pub const LOG_VERBOSITY_SYMBOL: &str = "flann_log_verbosity";
pub const SET_DISTANCE_TYPE_SYMBOL: &str = "flann_set_distance_type";

/// 원소 타입 하나에 대해 해석된 함수 포인터 묶음.
#[derive(Clone, Copy)]
pub struct ElementApi<T: Element> {
    pub build_index: BuildIndexFn<T>,
    pub add_points: AddPointsFn<T>,
    pub save_index: SaveIndexFn,
    pub load_index: LoadIndexFn<T>,
    pub find_nearest_neighbors: FindNearestNeighborsFn<T, T::Dist>,
    pub find_nearest_neighbors_index: FindNearestNeighborsIndexFn<T, T::Dist>,
    pub radius_search: RadiusSearchFn<T, T::Dist>,
    pub compute_cluster_centers: ComputeClusterCentersFn<T, T::Dist>,
    pub free_index: FreeIndexFn,
}

impl<T: Element> ElementApi<T> {
    /// `Operation::ALL` 순서의 심볼 이름. 적재기는 이 배열을 그대로 해석한다.
    pub fn symbols() -> [String; 9] {
        Operation::ALL.map(|operation| operation.symbol_for::<T>())
    }
}

/// 라이브러리 전체의 호출 규약 테이블.
#[derive(Clone, Copy)]
pub struct NativeApi {
    pub log_verbosity: LogVerbosityFn,
    pub set_distance_type: SetDistanceTypeFn,
    pub float: ElementApi<f32>,
    pub double: ElementApi<f64>,
    pub byte: ElementApi<u8>,
    pub int: ElementApi<i32>,
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for u8 {}
    impl Sealed for i32 {}
}

/// 네이티브 라이브러리가 지원하는 원소 타입.
pub trait Element: sealed::Sealed + Copy + Default + Send + Sync + 'static {
    /// 거리/클러스터 중심 버퍼의 원소 타입.
    type Dist: Copy + Default + Send + Sync + 'static;

    /// C 심볼 접미사.
    const SUFFIX: &'static str;
    /// 호스트 배열 dtype 이름.
    const DTYPE: &'static str;

    fn api(table: &NativeApi) -> &ElementApi<Self>;
}

impl Element for f32 {
    type Dist = f32;
    const SUFFIX: &'static str = "float";
    const DTYPE: &'static str = "float32";

    fn api(table: &NativeApi) -> &ElementApi<Self> {
        &table.float
    }
}

impl Element for f64 {
    type Dist = f64;
    const SUFFIX: &'static str = "double";
    const DTYPE: &'static str = "float64";

    fn api(table: &NativeApi) -> &ElementApi<Self> {
        &table.double
    }
}

impl Element for u8 {
    type Dist = f32;
    const SUFFIX: &'static str = "byte";
    const DTYPE: &'static str = "uint8";

    fn api(table: &NativeApi) -> &ElementApi<Self> {
        &table.byte
    }
}

impl Element for i32 {
    type Dist = f32;
    const SUFFIX: &'static str = "int";
    const DTYPE: &'static str = "int32";

    fn api(table: &NativeApi) -> &ElementApi<Self> {
        &table.int
    }
}

/// 적재 시 해석해야 하는 모든 심볼 이름. `NativeApi` 필드 순서를 따른다.
pub fn required_symbols() -> Vec<String> {
    let mut symbols = vec![
        LOG_VERBOSITY_SYMBOL.to_string(),
        SET_DISTANCE_TYPE_SYMBOL.to_string(),
    ];
    symbols.extend(ElementApi::<f32>::symbols());
    symbols.extend(ElementApi::<f64>::symbols());
    symbols.extend(ElementApi::<u8>::symbols());
    symbols.extend(ElementApi::<i32>::symbols());
    symbols
}
