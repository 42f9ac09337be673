// 목적:
// - 파라미터 레코드의 기호 옵션(알고리즘, 중심 초기화, 로그 수준, 거리 종류)을 정의한다.
//
// 설명:
// - 각 옵션은 네이티브 계층이 소비하는 정수 코드와 기호 이름을 양방향으로 변환한다.
// - "default" 같은 별칭은 이름 -> 코드 방향에서만 인정하며, 역변환은 항상 정규 이름을 돌려준다.
//
// 디자인 패턴:
// - 정적 변환 테이블(Static Translation Table).
//
// 참조:
// - src_rs/params/record.rs

use std::fmt;

use crate::core::errors::{FlannError, FlannResult};

/// 정수 코드와 기호 이름 사이를 오가는 옵션 열거형의 공통 동작이다.
pub trait SymbolicOption: Copy + Eq + Sized + 'static {
    /// 파라미터 이름. 오류 메시지에 사용한다.
    const FIELD: &'static str;
    /// 정규 옵션 목록. 선언 순서가 곧 역변환 우선순위다.
    const ALL: &'static [Self];
    /// 이름 -> 정규 옵션 별칭 목록.
    const ALIASES: &'static [(&'static str, Self)];

    fn code(self) -> i32;
    fn name(self) -> &'static str;

    fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|option| option.code() == code)
    }

    fn from_name(name: &str) -> Option<Self> {
        let needle = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|option| option.name() == needle)
            .or_else(|| {
                Self::ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == needle)
                    .map(|(_, option)| *option)
            })
    }

    fn parse(name: &str) -> FlannResult<Self> {
        Self::from_name(name).ok_or_else(|| {
            let known = Self::ALL
                .iter()
                .map(|option| option.name())
                .chain(Self::ALIASES.iter().map(|(alias, _)| *alias))
                .collect::<Vec<_>>()
                .join(", ");
            FlannError::InvalidParameter(format!(
                "{}에 알 수 없는 값입니다: {} (허용: {})",
                Self::FIELD,
                name,
                known
            ))
        })
    }
}

/// 인덱스 알고리즘.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    Linear,
    #[default]
    KdTree,
    KMeans,
    Composite,
    KdTreeSingle,
    Hierarchical,
    Lsh,
    Saved,
    Autotuned,
}

impl SymbolicOption for Algorithm {
    const FIELD: &'static str = "algorithm";
    const ALL: &'static [Self] = &[
        Self::Linear,
        Self::KdTree,
        Self::KMeans,
        Self::Composite,
        Self::KdTreeSingle,
        Self::Hierarchical,
        Self::Lsh,
        Self::Saved,
        Self::Autotuned,
    ];
    const ALIASES: &'static [(&'static str, Self)] = &[("default", Self::KdTree)];

    fn code(self) -> i32 {
        match self {
            Self::Linear => 0,
            Self::KdTree => 1,
            Self::KMeans => 2,
            Self::Composite => 3,
            Self::KdTreeSingle => 4,
            Self::Hierarchical => 5,
            Self::Lsh => 6,
            Self::Saved => 254,
            Self::Autotuned => 255,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::KdTree => "kdtree",
            Self::KMeans => "kmeans",
            Self::Composite => "composite",
            Self::KdTreeSingle => "kdtree_single",
            Self::Hierarchical => "hierarchical",
            Self::Lsh => "lsh",
            Self::Saved => "saved",
            Self::Autotuned => "autotuned",
        }
    }
}

/// k-means 중심 초기화 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CentersInit {
    #[default]
    Random,
    Gonzales,
    KMeansPP,
}

impl SymbolicOption for CentersInit {
    const FIELD: &'static str = "centers_init";
    const ALL: &'static [Self] = &[Self::Random, Self::Gonzales, Self::KMeansPP];
    const ALIASES: &'static [(&'static str, Self)] = &[("default", Self::Random)];

    fn code(self) -> i32 {
        match self {
            Self::Random => 0,
            Self::Gonzales => 1,
            Self::KMeansPP => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Gonzales => "gonzales",
            Self::KMeansPP => "kmeanspp",
        }
    }
}

/// 네이티브 라이브러리 로그 수준.
///
/// 레코드 기본값은 `Warning`이지만 "default" 별칭은 `Error`를 가리킨다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LogLevel {
    None,
    Fatal,
    Error,
    #[default]
    Warning,
    Info,
}

impl SymbolicOption for LogLevel {
    const FIELD: &'static str = "log_level";
    const ALL: &'static [Self] = &[
        Self::None,
        Self::Fatal,
        Self::Error,
        Self::Warning,
        Self::Info,
    ];
    const ALIASES: &'static [(&'static str, Self)] = &[("default", Self::Error)];

    fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Fatal => 1,
            Self::Error => 2,
            Self::Warning => 3,
            Self::Info => 4,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// `flann_set_distance_type`에 전달하는 거리 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistanceType {
    #[default]
    Euclidean,
    Manhattan,
    Minkowski,
    MaxDist,
    HistIntersect,
    Hellinger,
    ChiSquare,
    KullbackLeibler,
}

impl SymbolicOption for DistanceType {
    const FIELD: &'static str = "distance_type";
    const ALL: &'static [Self] = &[
        Self::Euclidean,
        Self::Manhattan,
        Self::Minkowski,
        Self::MaxDist,
        Self::HistIntersect,
        Self::Hellinger,
        Self::ChiSquare,
        Self::KullbackLeibler,
    ];
    const ALIASES: &'static [(&'static str, Self)] = &[
        ("default", Self::Euclidean),
        ("cs", Self::ChiSquare),
        ("kl", Self::KullbackLeibler),
    ];

    fn code(self) -> i32 {
        match self {
            Self::Euclidean => 1,
            Self::Manhattan => 2,
            Self::Minkowski => 3,
            Self::MaxDist => 4,
            Self::HistIntersect => 5,
            Self::Hellinger => 6,
            Self::ChiSquare => 7,
            Self::KullbackLeibler => 8,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
            Self::Minkowski => "minkowski",
            Self::MaxDist => "max_dist",
            Self::HistIntersect => "hik",
            Self::Hellinger => "hellinger",
            Self::ChiSquare => "chi_square",
            Self::KullbackLeibler => "kullback_leibler",
        }
    }
}

macro_rules! impl_display_by_name {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.name())
                }
            }
        )+
    };
}

impl_display_by_name!(Algorithm, CentersInit, LogLevel, DistanceType);
