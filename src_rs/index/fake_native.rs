// 목적:
// - 단위 테스트용 가짜 네이티브 진입점 테이블을 제공한다.
//
// 설명:
// - 각 함수는 받은 인자를 스레드 로컬 기록에 남기고 스크립트로 정한 값을 돌려준다.
// - 테스트마다 library()를 호출하면 스크립트와 기록이 초기화된다.
//
// 참조:
// - src_rs/loader/signatures.rs
// - src_rs/loader/library.rs

use std::cell::RefCell;
use std::ffi::CStr;
use std::os::raw::{c_char, c_float, c_int, c_void};
use std::path::PathBuf;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::loader::library::FlannLibrary;
use crate::loader::signatures::{Element, ElementApi, IndexHandle, NativeApi};
use crate::params::record::FlannParameters;

#[derive(Debug, Default)]
pub(crate) struct Script {
    pub null_handle: bool,
    pub status: c_int,
    pub radius_found: c_int,
    pub centers: c_int,
    pub free_status: c_int,
    pub speedup: f32,
    pub tuned_checks: Option<c_int>,
}

#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub built: Vec<(c_int, c_int)>,
    pub loaded: Vec<String>,
    pub saved: Vec<String>,
    pub added: Vec<(usize, c_int, c_int, f32)>,
    pub knn: Vec<(c_int, c_int, c_int)>,
    pub radius: Vec<(c_int, f32)>,
    pub clusters: Vec<(c_int, c_int, c_int)>,
    pub freed: Vec<usize>,
    pub log_levels: Vec<c_int>,
    pub distances: Vec<(c_int, c_int)>,
}

thread_local! {
    static SCRIPT: RefCell<Script> = RefCell::new(Script::default());
    static CALLS: RefCell<Calls> = RefCell::new(Calls::default());
}

static NEXT_HANDLE: AtomicUsize = AtomicUsize::new(1);

/// 기록을 비우고 가짜 테이블을 담은 라이브러리를 만든다.
pub(crate) fn library() -> Arc<FlannLibrary> {
    SCRIPT.with(|script| *script.borrow_mut() = Script::default());
    CALLS.with(|calls| *calls.borrow_mut() = Calls::default());
    Arc::new(FlannLibrary::from_api(
        PathBuf::from("fake/libflann.so"),
        native_api(),
    ))
}

pub(crate) fn script(edit: impl FnOnce(&mut Script)) {
    SCRIPT.with(|script| edit(&mut script.borrow_mut()));
}

pub(crate) fn calls<R>(read: impl FnOnce(&Calls) -> R) -> R {
    CALLS.with(|calls| read(&calls.borrow()))
}

fn scripted<R>(read: impl FnOnce(&Script) -> R) -> R {
    SCRIPT.with(|script| read(&script.borrow()))
}

fn record(edit: impl FnOnce(&mut Calls)) {
    CALLS.with(|calls| edit(&mut calls.borrow_mut()));
}

fn next_handle() -> IndexHandle {
    (NEXT_HANDLE.fetch_add(1, Ordering::Relaxed) * 16) as *mut c_void
}

unsafe fn text(raw: *const c_char) -> String {
    CStr::from_ptr(raw).to_string_lossy().into_owned()
}

unsafe extern "C" fn log_verbosity(level: c_int) {
    record(|calls| calls.log_levels.push(level));
}

unsafe extern "C" fn set_distance_type(distance_type: c_int, order: c_int) {
    record(|calls| calls.distances.push((distance_type, order)));
}

unsafe extern "C" fn build_index<T: Element>(
    _dataset: *const T,
    rows: c_int,
    cols: c_int,
    speedup: *mut c_float,
    params: *mut FlannParameters,
) -> IndexHandle {
    record(|calls| calls.built.push((rows, cols)));
    let (null_handle, scripted_speedup, tuned_checks) =
        scripted(|script| (script.null_handle, script.speedup, script.tuned_checks));
    if null_handle {
        return ptr::null_mut();
    }

    *speedup = scripted_speedup;
    if let Some(checks) = tuned_checks {
        (*params).checks = checks;
    }
    next_handle()
}

unsafe extern "C" fn add_points<T: Element>(
    _index: IndexHandle,
    points: *const T,
    rows: c_int,
    cols: c_int,
    rebuild_threshold: c_float,
) -> c_int {
    record(|calls| {
        calls
            .added
            .push((points as usize, rows, cols, rebuild_threshold))
    });
    scripted(|script| script.status)
}

unsafe extern "C" fn save_index(_index: IndexHandle, filename: *const c_char) -> c_int {
    let filename = text(filename);
    record(|calls| calls.saved.push(filename));
    scripted(|script| script.status)
}

unsafe extern "C" fn load_index<T: Element>(
    filename: *const c_char,
    _dataset: *const T,
    _rows: c_int,
    _cols: c_int,
) -> IndexHandle {
    let filename = text(filename);
    record(|calls| calls.loaded.push(filename));
    if scripted(|script| script.null_handle) {
        return ptr::null_mut();
    }
    next_handle()
}

unsafe extern "C" fn find_nearest_neighbors<T: Element>(
    _dataset: *const T,
    rows: c_int,
    _cols: c_int,
    _testset: *const T,
    tcount: c_int,
    result: *mut c_int,
    _dists: *mut T::Dist,
    nn: c_int,
    params: *mut FlannParameters,
) -> c_int {
    let checks = (*params).checks;
    record(|calls| calls.knn.push((tcount, nn, checks)));
    for slot in 0..(tcount * nn) {
        *result.add(slot as usize) = slot % rows;
    }
    scripted(|script| script.status)
}

unsafe extern "C" fn find_nearest_neighbors_index<T: Element>(
    _index: IndexHandle,
    _testset: *const T,
    tcount: c_int,
    result: *mut c_int,
    _dists: *mut T::Dist,
    nn: c_int,
    params: *mut FlannParameters,
) -> c_int {
    let checks = (*params).checks;
    record(|calls| calls.knn.push((tcount, nn, checks)));
    for slot in 0..(tcount * nn) {
        *result.add(slot as usize) = slot;
    }
    scripted(|script| script.status)
}

unsafe extern "C" fn radius_search<T: Element>(
    _index: IndexHandle,
    _query: *const T,
    indices: *mut c_int,
    _dists: *mut T::Dist,
    max_nn: c_int,
    radius: c_float,
    _params: *mut FlannParameters,
) -> c_int {
    record(|calls| calls.radius.push((max_nn, radius)));
    let found = scripted(|script| script.radius_found);
    for slot in 0..found.min(max_nn) {
        *indices.add(slot as usize) = slot;
    }
    found
}

unsafe extern "C" fn compute_cluster_centers<T: Element>(
    _dataset: *const T,
    rows: c_int,
    _cols: c_int,
    clusters: c_int,
    _result: *mut T::Dist,
    params: *mut FlannParameters,
) -> c_int {
    let branching = (*params).branching;
    record(|calls| calls.clusters.push((rows, clusters, branching)));
    scripted(|script| script.centers)
}

unsafe extern "C" fn free_index(index: IndexHandle, _params: *mut FlannParameters) -> c_int {
    record(|calls| calls.freed.push(index as usize));
    scripted(|script| script.free_status)
}

fn element_api<T: Element>() -> ElementApi<T> {
    ElementApi {
        build_index: build_index::<T>,
        add_points: add_points::<T>,
        save_index,
        load_index: load_index::<T>,
        find_nearest_neighbors: find_nearest_neighbors::<T>,
        find_nearest_neighbors_index: find_nearest_neighbors_index::<T>,
        radius_search: radius_search::<T>,
        compute_cluster_centers: compute_cluster_centers::<T>,
        free_index,
    }
}

fn native_api() -> NativeApi {
    NativeApi {
        log_verbosity,
        set_distance_type,
        float: element_api(),
        double: element_api(),
        byte: element_api(),
        int: element_api(),
    }
}
