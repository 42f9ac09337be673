// 목적:
// - tracing 구독자 초기화를 담당한다.
//
// 설명:
// - FLANN_BRIDGE_LOG 환경 변수로 필터를 지정하고, 없으면 warn 수준을 사용한다.
// - 여러 번 호출되어도 최초 한 번만 설치된다.
//
// 참조:
// - src_rs/loader/discovery.rs

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub const ENV_LOG_FILTER: &str = "FLANN_BRIDGE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

static INIT: Once = Once::new();

/// 전역 로깅을 초기화한다. 이미 다른 구독자가 있으면 아무것도 하지 않는다.
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(ENV_LOG_FILTER)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
