//! 公共工具库（common）
//!
//! - 初始化日志：读取 RUST_LOG，未设置时默认 info
//! - 日志写到 stderr，stdout 留给 UCCI 协议输出
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "info";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// 可重复调用，已经初始化过时直接返回
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(DEFAULT_LOG_FILTER))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
