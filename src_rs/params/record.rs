// 목적:
// - 네이티브 라이브러리가 기대하는 고정 레이아웃 파라미터 레코드를 정의한다.
//
// 설명:
// - 필드 순서와 네이티브 타입(int/float/unsigned/long)은 C 헤더의 FLANNParameters와 같아야 한다.
// - 이름 기반 읽기/쓰기와 JSON 덮어쓰기를 제공하며, 번역 대상 필드는 기호 이름으로 주고받는다.
//
// 디자인 패턴:
// - 값 객체(Value Object) + 변환 테이블(Translation Table).
//
// 참조:
// - src_rs/params/options.rs
// - src_rs/loader/signatures.rs

use std::collections::BTreeMap;
use std::fmt;
use std::os::raw::{c_float, c_int, c_long, c_uint};

use serde::{Deserialize, Serialize};

use crate::core::errors::{FlannError, FlannResult};
use crate::params::options::{Algorithm, CentersInit, LogLevel, SymbolicOption};

/// 레코드 필드의 네이티브 타입 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Unsigned,
    Long,
    Algorithm,
    CentersInit,
    LogLevel,
}

/// 선언 순서대로 나열한 필드 이름과 타입.
pub const FIELDS: &[(&str, FieldKind)] = &[
    ("algorithm", FieldKind::Algorithm),
    ("checks", FieldKind::Int),
    ("eps", FieldKind::Float),
    ("sorted", FieldKind::Int),
    ("max_neighbors", FieldKind::Int),
    ("cores", FieldKind::Int),
    ("trees", FieldKind::Int),
    ("leaf_max_size", FieldKind::Int),
    ("branching", FieldKind::Int),
    ("iterations", FieldKind::Int),
    ("centers_init", FieldKind::CentersInit),
    ("cb_index", FieldKind::Float),
    ("target_precision", FieldKind::Float),
    ("build_weight", FieldKind::Float),
    ("memory_weight", FieldKind::Float),
    ("sample_fraction", FieldKind::Float),
    ("table_number_", FieldKind::Unsigned),
    ("key_size_", FieldKind::Unsigned),
    ("multi_probe_level_", FieldKind::Unsigned),
    ("log_level", FieldKind::LogLevel),
    ("random_seed", FieldKind::Long),
];

/// 이름 기반 접근에서 주고받는 값이다.
///
/// JSON 덮어쓰기의 `true`/`false`는 `Bool`로 들어오며 정수 필드에 1/0으로 기록된다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    fn as_integer(&self, key: &str) -> FlannResult<i64> {
        match self {
            Self::Bool(flag) => Ok(i64::from(*flag)),
            Self::Int(value) => Ok(*value),
            Self::Float(value) if value.fract() == 0.0 && value.is_finite() => Ok(*value as i64),
            other => Err(FlannError::InvalidParameter(format!(
                "{}에는 정수가 필요합니다: {}",
                key, other
            ))),
        }
    }

    fn as_float(&self, key: &str) -> FlannResult<f64> {
        match self {
            Self::Int(value) => Ok(*value as f64),
            Self::Float(value) => Ok(*value),
            other => Err(FlannError::InvalidParameter(format!(
                "{}에는 실수가 필요합니다: {}",
                key, other
            ))),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(flag) => write!(f, "{}", flag),
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Text(text) => write!(f, "{:?}", text),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// 네이티브 `FLANNParameters`와 바이트 단위로 같은 레코드다.
///
/// 번역 대상 필드(algorithm, centers_init, log_level)는 정수 코드로 저장한다.
/// 테이블에 없는 코드도 그대로 보관할 수 있어야 하기 때문이다.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlannParameters {
    pub algorithm: c_int,
    pub checks: c_int,
    pub eps: c_float,
    pub sorted: c_int,
    pub max_neighbors: c_int,
    pub cores: c_int,
    pub trees: c_int,
    pub leaf_max_size: c_int,
    pub branching: c_int,
    pub iterations: c_int,
    pub centers_init: c_int,
    pub cb_index: c_float,
    pub target_precision: c_float,
    pub build_weight: c_float,
    pub memory_weight: c_float,
    pub sample_fraction: c_float,
    pub table_number_: c_uint,
    pub key_size_: c_uint,
    pub multi_probe_level_: c_uint,
    pub log_level: c_int,
    pub random_seed: c_long,
}

impl Default for FlannParameters {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::KdTree.code(),
            checks: 32,
            eps: 0.0,
            sorted: 1,
            max_neighbors: -1,
            cores: 0,
            trees: 1,
            leaf_max_size: 4,
            branching: 32,
            iterations: 5,
            centers_init: CentersInit::Random.code(),
            cb_index: 0.5,
            target_precision: 0.9,
            build_weight: 0.01,
            memory_weight: 0.0,
            sample_fraction: 0.1,
            table_number_: 12,
            key_size_: 20,
            multi_probe_level_: 2,
            log_level: LogLevel::Warning.code(),
            random_seed: -1,
        }
    }
}

impl FlannParameters {
    pub fn keys() -> impl Iterator<Item = &'static str> {
        FIELDS.iter().map(|(name, _)| *name)
    }

    pub fn field_kind(key: &str) -> Option<FieldKind> {
        FIELDS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
    }

    pub fn algorithm(&self) -> Option<Algorithm> {
        Algorithm::from_code(self.algorithm)
    }

    pub fn centers_init(&self) -> Option<CentersInit> {
        CentersInit::from_code(self.centers_init)
    }

    pub fn log_level(&self) -> Option<LogLevel> {
        LogLevel::from_code(self.log_level)
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm.code();
        self
    }

    pub fn with_centers_init(mut self, centers_init: CentersInit) -> Self {
        self.centers_init = centers_init.code();
        self
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level.code();
        self
    }

    /// 필드 값을 읽는다. 번역 대상 필드는 기호 이름으로 돌려준다.
    pub fn get(&self, key: &str) -> Option<ParamValue> {
        let value = match key {
            "algorithm" => translate_back::<Algorithm>(self.algorithm),
            "checks" => ParamValue::from(self.checks),
            "eps" => ParamValue::from(self.eps),
            "sorted" => ParamValue::from(self.sorted),
            "max_neighbors" => ParamValue::from(self.max_neighbors),
            "cores" => ParamValue::from(self.cores),
            "trees" => ParamValue::from(self.trees),
            "leaf_max_size" => ParamValue::from(self.leaf_max_size),
            "branching" => ParamValue::from(self.branching),
            "iterations" => ParamValue::from(self.iterations),
            "centers_init" => translate_back::<CentersInit>(self.centers_init),
            "cb_index" => ParamValue::from(self.cb_index),
            "target_precision" => ParamValue::from(self.target_precision),
            "build_weight" => ParamValue::from(self.build_weight),
            "memory_weight" => ParamValue::from(self.memory_weight),
            "sample_fraction" => ParamValue::from(self.sample_fraction),
            "table_number_" => ParamValue::Int(i64::from(self.table_number_)),
            "key_size_" => ParamValue::Int(i64::from(self.key_size_)),
            "multi_probe_level_" => ParamValue::Int(i64::from(self.multi_probe_level_)),
            "log_level" => translate_back::<LogLevel>(self.log_level),
            "random_seed" => ParamValue::Int(i64::from(self.random_seed)),
            _ => return None,
        };
        Some(value)
    }

    /// 필드 값을 쓴다. 존재하지 않는 필드는 오류로 처리한다.
    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) -> FlannResult<()> {
        let value = value.into();
        match key {
            "algorithm" => self.algorithm = translate::<Algorithm>(key, &value)?,
            "checks" => self.checks = to_c_int(key, &value)?,
            "eps" => self.eps = to_c_float(key, &value)?,
            "sorted" => self.sorted = to_c_int(key, &value)?,
            "max_neighbors" => self.max_neighbors = to_c_int(key, &value)?,
            "cores" => self.cores = to_c_int(key, &value)?,
            "trees" => self.trees = to_c_int(key, &value)?,
            "leaf_max_size" => self.leaf_max_size = to_c_int(key, &value)?,
            "branching" => self.branching = to_c_int(key, &value)?,
            "iterations" => self.iterations = to_c_int(key, &value)?,
            "centers_init" => self.centers_init = translate::<CentersInit>(key, &value)?,
            "cb_index" => self.cb_index = to_c_float(key, &value)?,
            "target_precision" => self.target_precision = to_c_float(key, &value)?,
            "build_weight" => self.build_weight = to_c_float(key, &value)?,
            "memory_weight" => self.memory_weight = to_c_float(key, &value)?,
            "sample_fraction" => self.sample_fraction = to_c_float(key, &value)?,
            "table_number_" => self.table_number_ = to_c_uint(key, &value)?,
            "key_size_" => self.key_size_ = to_c_uint(key, &value)?,
            "multi_probe_level_" => self.multi_probe_level_ = to_c_uint(key, &value)?,
            "log_level" => self.log_level = translate::<LogLevel>(key, &value)?,
            "random_seed" => self.random_seed = to_c_long(key, &value)?,
            _ => return Err(FlannError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }

    /// 여러 값을 한 번에 쓴다. 레코드에 없는 키는 건너뛴다.
    ///
    /// 상위 API가 레코드 외의 키워드(예: 반환 형식)를 같은 맵에 섞어 보내기 때문이다.
    /// 값 하나라도 거부되면 레코드는 호출 전 상태로 남는다.
    pub fn update<I, K, V>(&mut self, entries: I) -> FlannResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        let mut staged = *self;
        for (key, value) in entries {
            let key = key.as_ref();
            if Self::field_kind(key).is_none() {
                tracing::trace!(key, "unknown parameter skipped");
                continue;
            }
            staged.set(key, value)?;
        }
        *self = staged;
        Ok(())
    }

    /// 선언 순서대로 (이름, 값) 목록을 만든다.
    pub fn entries(&self) -> Vec<(&'static str, ParamValue)> {
        Self::keys()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
            .collect()
    }

    /// 기본값 위에 JSON 객체의 덮어쓰기를 적용한다.
    pub fn from_json(json: &str) -> FlannResult<Self> {
        let mut params = Self::default();
        params.apply_json(json)?;
        Ok(params)
    }

    pub fn apply_json(&mut self, json: &str) -> FlannResult<()> {
        let overrides: BTreeMap<String, ParamValue> =
            serde_json::from_str(json).map_err(|error| {
                FlannError::Serialization(format!("파라미터 JSON 파싱에 실패했습니다: {}", error))
            })?;

        self.update(overrides)
    }

    pub fn to_json(&self) -> FlannResult<String> {
        let snapshot = self.entries().into_iter().collect::<BTreeMap<_, _>>();

        serde_json::to_string(&snapshot)
            .map_err(|error| FlannError::Serialization(format!("파라미터 직렬화 실패: {}", error)))
    }
}

fn translate<T: SymbolicOption>(key: &str, value: &ParamValue) -> FlannResult<c_int> {
    match value {
        ParamValue::Text(name) => Ok(T::parse(name)?.code()),
        other => to_c_int(key, other),
    }
}

fn translate_back<T: SymbolicOption>(code: c_int) -> ParamValue {
    T::from_code(code)
        .map(|option| ParamValue::Text(option.name().to_string()))
        .unwrap_or(ParamValue::Int(i64::from(code)))
}

fn to_c_int(key: &str, value: &ParamValue) -> FlannResult<c_int> {
    let raw = value.as_integer(key)?;
    c_int::try_from(raw).map_err(|_| {
        FlannError::InvalidParameter(format!("{} 값이 int 범위를 벗어났습니다: {}", key, raw))
    })
}

fn to_c_uint(key: &str, value: &ParamValue) -> FlannResult<c_uint> {
    let raw = value.as_integer(key)?;
    c_uint::try_from(raw).map_err(|_| {
        FlannError::InvalidParameter(format!(
            "{} 값이 unsigned int 범위를 벗어났습니다: {}",
            key, raw
        ))
    })
}

fn to_c_long(key: &str, value: &ParamValue) -> FlannResult<c_long> {
    let raw = value.as_integer(key)?;
    c_long::try_from(raw).map_err(|_| {
        FlannError::InvalidParameter(format!("{} 값이 long 범위를 벗어났습니다: {}", key, raw))
    })
}

fn to_c_float(key: &str, value: &ParamValue) -> FlannResult<c_float> {
    Ok(value.as_float(key)? as c_float)
}
