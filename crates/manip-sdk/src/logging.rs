//! 日志初始化
//!
//! `RUST_LOG` 优先；未设置或无法解析时使用传入的默认指令。

use tracing_subscriber::EnvFilter;

/// 默认日志指令
pub const DEFAULT_LOG_DIRECTIVE: &str = "manip=info";

/// 使用 [`DEFAULT_LOG_DIRECTIVE`] 初始化全局 subscriber
pub fn init_logging() -> bool {
    init_logging_with(DEFAULT_LOG_DIRECTIVE)
}

/// 使用指定的默认指令初始化全局 subscriber
///
/// 全局 subscriber 已经存在时返回 `false`，不会 panic。
pub fn init_logging_with(directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}
