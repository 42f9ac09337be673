use std::fs;
use std::mem::{offset_of, size_of};
use std::os::raw::c_long;
use std::path::{Path, PathBuf};

use rstest::rstest;
use tempfile::TempDir;

use _flann_bridge::core::config::LibraryConfig;
use _flann_bridge::core::errors::FlannError;
use _flann_bridge::loader::discovery::{find_library_for, MAX_PARENT_STEPS};
use _flann_bridge::loader::platform::Platform;
use _flann_bridge::loader::module_path::{module_dir, module_path};
use _flann_bridge::loader::signatures::{required_symbols, Element, ElementApi, Operation};
use _flann_bridge::params::{
    Algorithm, CentersInit, DistanceType, FlannParameters, LogLevel, ParamValue, SymbolicOption,
};
use _flann_bridge::{FlannLibrary, Matrix, MatrixRef};

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

fn nested(root: &Path, depth: usize) -> PathBuf {
    let mut dir = root.to_path_buf();
    for level in 0..depth {
        dir.push(format!("l{}", level));
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[rstest]
#[case("linear", 0)]
#[case("kdtree", 1)]
#[case("kmeans", 2)]
#[case("composite", 3)]
#[case("kdtree_single", 4)]
#[case("hierarchical", 5)]
#[case("lsh", 6)]
#[case("saved", 254)]
#[case("autotuned", 255)]
fn algorithm_names_and_codes_round_trip(#[case] name: &str, #[case] code: i32) {
    let mut params = FlannParameters::default();
    params.set("algorithm", name).unwrap();
    assert_eq!(params.algorithm, code);
    assert_eq!(params.get("algorithm"), Some(ParamValue::from(name)));
    assert_eq!(Algorithm::from_code(code).map(Algorithm::name), Some(name));
}

#[rstest]
#[case("random", 0)]
#[case("gonzales", 1)]
#[case("kmeanspp", 2)]
fn centers_init_names_and_codes_round_trip(#[case] name: &str, #[case] code: i32) {
    let option = CentersInit::from_name(name).unwrap();
    assert_eq!(option.code(), code);
    assert_eq!(CentersInit::from_code(code), Some(option));
}

#[rstest]
#[case("none", 0)]
#[case("fatal", 1)]
#[case("error", 2)]
#[case("warning", 3)]
#[case("info", 4)]
fn log_level_names_and_codes_round_trip(#[case] name: &str, #[case] code: i32) {
    let mut params = FlannParameters::default();
    params.set("log_level", name).unwrap();
    assert_eq!(params.log_level, code);
    assert_eq!(params.log_level().map(LogLevel::name), Some(name));
}

#[rstest]
#[case("algorithm", 1, "kdtree")]
#[case("centers_init", 0, "random")]
#[case("log_level", 2, "error")]
fn default_alias_reads_back_as_canonical_name(
    #[case] key: &str,
    #[case] code: i64,
    #[case] canonical: &str,
) {
    let mut params = FlannParameters::default();
    params.set(key, "default").unwrap();
    assert_eq!(params.get(key), Some(ParamValue::from(canonical)));

    let mut raw = FlannParameters::default();
    raw.set(key, code).unwrap();
    assert_eq!(raw, params);
}

#[test]
fn distance_aliases_share_codes() {
    assert_eq!(DistanceType::parse("cs").unwrap().code(), 7);
    assert_eq!(DistanceType::parse("kl").unwrap().code(), 8);
    assert_eq!(DistanceType::parse("chi_square").unwrap(), DistanceType::ChiSquare);
}

#[test]
fn unknown_symbolic_option_is_rejected() {
    let mut params = FlannParameters::default();
    let error = params.set("centers_init", "kmedoids").unwrap_err();
    assert!(matches!(error, FlannError::InvalidParameter(_)));
    assert_eq!(params.centers_init, 0);
}

#[test]
fn parameter_record_matches_native_layout() {
    let long = size_of::<c_long>();
    assert_eq!(offset_of!(FlannParameters, algorithm), 0);
    assert_eq!(offset_of!(FlannParameters, checks), 4);
    assert_eq!(offset_of!(FlannParameters, eps), 8);
    assert_eq!(offset_of!(FlannParameters, sorted), 12);
    assert_eq!(offset_of!(FlannParameters, max_neighbors), 16);
    assert_eq!(offset_of!(FlannParameters, cores), 20);
    assert_eq!(offset_of!(FlannParameters, trees), 24);
    assert_eq!(offset_of!(FlannParameters, leaf_max_size), 28);
    assert_eq!(offset_of!(FlannParameters, branching), 32);
    assert_eq!(offset_of!(FlannParameters, iterations), 36);
    assert_eq!(offset_of!(FlannParameters, centers_init), 40);
    assert_eq!(offset_of!(FlannParameters, cb_index), 44);
    assert_eq!(offset_of!(FlannParameters, target_precision), 48);
    assert_eq!(offset_of!(FlannParameters, build_weight), 52);
    assert_eq!(offset_of!(FlannParameters, memory_weight), 56);
    assert_eq!(offset_of!(FlannParameters, sample_fraction), 60);
    assert_eq!(offset_of!(FlannParameters, table_number_), 64);
    assert_eq!(offset_of!(FlannParameters, key_size_), 68);
    assert_eq!(offset_of!(FlannParameters, multi_probe_level_), 72);
    assert_eq!(offset_of!(FlannParameters, log_level), 76);
    assert_eq!(offset_of!(FlannParameters, random_seed), 80);
    assert_eq!(size_of::<FlannParameters>(), (80 + long).next_multiple_of(long));
}

#[test]
fn keys_follow_declaration_order() {
    let keys = FlannParameters::keys().collect::<Vec<_>>();
    assert_eq!(keys.len(), 21);
    assert_eq!(keys.first(), Some(&"algorithm"));
    assert_eq!(keys.last(), Some(&"random_seed"));
    assert!(keys.iter().all(|key| FlannParameters::default().get(key).is_some()));
}

#[test]
fn json_overrides_apply_on_top_of_defaults() {
    let params = FlannParameters::from_json(
        r#"{"algorithm": "kmeans", "branching": 16, "cb_index": 0.2, "sorted": false, "return_type": "x"}"#,
    )
    .unwrap();

    assert_eq!(params.algorithm(), Some(Algorithm::KMeans));
    assert_eq!(params.branching, 16);
    assert!((params.cb_index - 0.2).abs() < 1e-6);
    assert_eq!(params.sorted, 0);
    assert_eq!(params.checks, 32);

    let snapshot: serde_json::Value = serde_json::from_str(&params.to_json().unwrap()).unwrap();
    assert_eq!(snapshot["algorithm"], "kmeans");
    assert_eq!(snapshot["log_level"], "warning");
}

#[test]
fn malformed_json_is_a_serialization_error() {
    assert!(matches!(
        FlannParameters::from_json("[1, 2"),
        Err(FlannError::Serialization(_))
    ));
}

#[rstest]
#[case("")]
#[case("lib")]
#[case("build")]
#[case("build/lib")]
fn discovery_checks_every_candidate_directory(#[case] relative: &str) {
    let temp = TempDir::new().unwrap();
    let expected = temp.path().join(relative).join("libflann.so");
    touch(&expected);

    let found = find_library_for(Platform::Elf, "flann", temp.path(), false).unwrap();
    assert_eq!(found.path, expected);
    assert!(found.path.ends_with(Path::new(relative).join("libflann.so")));
    assert_eq!(found.tried.last(), Some(&found.path));
}

#[test]
fn discovery_walks_up_to_parent_build_dir() {
    let temp = TempDir::new().unwrap();
    let start = nested(temp.path(), 3);
    touch(&temp.path().join("l0").join("build").join("lib").join("libflann.so"));

    let found = find_library_for(Platform::Elf, "flann", &start, true).unwrap();
    assert!(found.path.ends_with("l0/build/lib/libflann.so"));
    // l2, l1에서 네 번씩 실패한 뒤 l0의 네 번째 후보에서 찾는다.
    assert_eq!(found.tried.len(), 4 * 2 + 4);
}

#[test]
fn discovery_stops_after_parent_limit() {
    let temp = TempDir::new().unwrap();
    let start = nested(temp.path(), MAX_PARENT_STEPS + 2);
    touch(&temp.path().join("l0").join("libflann.so"));

    let error = find_library_for(Platform::Elf, "flann", &start, true).unwrap_err();
    match error {
        FlannError::LibraryNotFound { tried } => {
            assert_eq!(tried.len(), 4 * (MAX_PARENT_STEPS + 1));
            assert!(!tried.contains(&temp.path().join("l0").join("libflann.so")));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn discovery_reaches_the_last_allowed_parent() {
    let temp = TempDir::new().unwrap();
    let start = nested(temp.path(), MAX_PARENT_STEPS + 1);
    touch(&temp.path().join("l0").join("libflann.so"));

    let found = find_library_for(Platform::Elf, "flann", &start, true).unwrap();
    assert!(found.path.ends_with("l0/libflann.so"));
}

#[test]
fn windows_discovery_tries_every_name_per_root() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("lib").join("flann.dll"));

    let found = find_library_for(Platform::Windows, "flann", temp.path(), false).unwrap();
    let names = found
        .tried
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "libflann.dll",
            "libflann.dll",
            "libflann.dll",
            "libflann.dll",
            "flann.dll",
            "flann.dll",
        ]
    );
}

#[test]
fn not_found_error_lists_every_tried_path() {
    let temp = TempDir::new().unwrap();
    let error = find_library_for(Platform::MacOs, "flann", temp.path(), false).unwrap_err();
    let message = error.to_string();

    assert_eq!(message.matches("\n * ").count(), 4);
    assert!(message.contains("libflann.dylib"));
    assert!(message.contains(&temp.path().join("build").join("lib").display().to_string()));
}

#[test]
fn loading_a_non_library_file_fails_with_load_error() {
    let temp = TempDir::new().unwrap();
    let bogus = temp.path().join("libflann.so");
    fs::write(&bogus, b"not a shared object").unwrap();

    match FlannLibrary::open(&bogus) {
        Err(FlannError::LibraryLoad { path, reason }) => {
            assert_eq!(path, bogus);
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn missing_explicit_path_is_reported_as_not_found() {
    let temp = TempDir::new().unwrap();
    let config = LibraryConfig {
        explicit_path: Some(temp.path().join("libmissing.so")),
        ..LibraryConfig::default()
    };

    match FlannLibrary::load(&config) {
        Err(FlannError::LibraryNotFound { tried }) => assert_eq!(tried.len(), 1),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn config_reads_environment_overrides() {
    let config = LibraryConfig::from_lookup(|key| match key {
        "FLANN_ROOT" => Some("/opt/flann".to_string()),
        "FLANN_LIBRARY_NAME" => Some(" flann_cpp ".to_string()),
        "FLANN_NO_RECURSE" => Some("1".to_string()),
        "FLANN_LIBRARY_PATH" => Some("   ".to_string()),
        _ => None,
    });

    assert_eq!(config.root_dir, Some(PathBuf::from("/opt/flann")));
    assert_eq!(config.library_name, "flann_cpp");
    assert!(!config.recurse);
    assert_eq!(config.explicit_path, None);
    assert_eq!(config.resolve_root().unwrap(), PathBuf::from("/opt/flann"));
}

#[test]
fn default_root_is_the_directory_of_the_image_holding_the_crate() {
    let exe = std::env::current_exe().unwrap().canonicalize().unwrap();
    let image = module_path().unwrap().canonicalize().unwrap();
    assert_eq!(image, exe);

    let root = LibraryConfig::default().resolve_root().unwrap();
    assert_eq!(Some(root.clone()), module_dir());
    assert_eq!(root, exe.parent().unwrap());
}

#[test]
fn default_discovery_looks_in_lib_next_to_the_image() {
    let name = format!("flann_image_root_{}", std::process::id());
    let file_name = Platform::current().unwrap().library_file_names(&name).remove(0);
    let lib_dir = module_dir().unwrap().join("lib");
    let candidate = lib_dir.join(file_name);
    touch(&candidate);

    let config = LibraryConfig {
        library_name: name,
        recurse: false,
        ..LibraryConfig::default()
    };
    let result = FlannLibrary::load(&config);
    fs::remove_file(&candidate).unwrap();
    let _ = fs::remove_dir(&lib_dir);

    match result {
        Err(FlannError::LibraryLoad { path, .. }) => assert_eq!(path, candidate),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn library_name_with_separator_is_rejected() {
    let config = LibraryConfig {
        library_name: "../flann".to_string(),
        ..LibraryConfig::default()
    };
    assert!(matches!(config.validate(), Err(FlannError::InvalidInput(_))));
}

#[test]
fn symbol_table_covers_every_operation_and_dtype() {
    let symbols = required_symbols();
    assert_eq!(symbols.len(), 2 + Operation::ALL.len() * 4);

    let mut unique = symbols.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), symbols.len());

    assert!(symbols.contains(&"flann_log_verbosity".to_string()));
    assert!(symbols.contains(&"flann_set_distance_type".to_string()));
    assert!(symbols.contains(&"flann_find_nearest_neighbors_index_double".to_string()));
    assert!(symbols.contains(&"flann_compute_cluster_centers_byte".to_string()));
}

#[test]
fn resolved_and_required_symbols_share_one_naming() {
    let double = ElementApi::<f64>::symbols();
    for (operation, symbol) in Operation::ALL.iter().zip(double.iter()) {
        assert_eq!(&operation.symbol_for::<f64>(), symbol);
    }

    let required = required_symbols();
    let per_dtype = [
        ElementApi::<f32>::symbols(),
        ElementApi::<f64>::symbols(),
        ElementApi::<u8>::symbols(),
        ElementApi::<i32>::symbols(),
    ];
    for (chunk, expected) in required[2..].chunks(Operation::ALL.len()).zip(per_dtype.iter()) {
        assert_eq!(chunk, &expected[..]);
    }
}

#[rstest]
#[case(Operation::BuildIndex, "flann_build_index_float", "flann_build_index_int")]
#[case(Operation::RadiusSearch, "flann_radius_search_float", "flann_radius_search_int")]
#[case(Operation::FreeIndex, "flann_free_index_float", "flann_free_index_int")]
fn symbols_use_native_type_suffixes(
    #[case] operation: Operation,
    #[case] float_symbol: &str,
    #[case] int_symbol: &str,
) {
    assert_eq!(operation.symbol_for::<f32>(), float_symbol);
    assert_eq!(operation.symbol_for::<i32>(), int_symbol);
    assert_eq!(<u8 as Element>::SUFFIX, "byte");
    assert_eq!(<f64 as Element>::SUFFIX, "double");
}

#[test]
fn double_data_uses_double_distances() {
    fn dist_size<T: Element>() -> usize {
        size_of::<T::Dist>()
    }

    assert_eq!(dist_size::<f64>(), 8);
    assert_eq!(dist_size::<f32>(), 4);
    assert_eq!(dist_size::<u8>(), 4);
    assert_eq!(dist_size::<i32>(), 4);
}

#[rstest]
#[case(vec![1.0f32, 2.0, 3.0], 0, 3)]
#[case(vec![1.0f32, 2.0, 3.0], 3, 0)]
#[case(vec![1.0f32, 2.0, 3.0], 2, 2)]
fn matrix_rejects_inconsistent_shapes(#[case] data: Vec<f32>, #[case] rows: usize, #[case] cols: usize) {
    assert!(matches!(
        Matrix::new(data.clone(), rows, cols),
        Err(FlannError::InvalidInput(_))
    ));
    assert!(matches!(
        MatrixRef::new(&data, rows, cols),
        Err(FlannError::InvalidInput(_))
    ));
}

#[test]
fn single_query_is_one_row() {
    let query = [0u8, 1, 2, 3];
    let view = MatrixRef::single(&query).unwrap();
    assert_eq!((view.rows(), view.cols()), (1, 4));
    assert_eq!(view.to_matrix().into_vec(), query.to_vec());
}

#[test]
fn logging_init_is_idempotent() {
    _flann_bridge::core::logging::init_logging();
    _flann_bridge::core::logging::init_logging();
    tracing::debug!("logging initialised twice");
}
