//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 使用默认级别初始化日志
pub fn init() {
    init_with_level("info");
}

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则使用传入的级别。重复调用不会报错。
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
