// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别与输出格式
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 输出格式环境变量 (text / json)
pub const LOG_FORMAT_ENV: &str = "SCRAP_ANALYTICS_LOG_FORMAT";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=scrap_analytics=trace
/// - SCRAP_ANALYTICS_LOG_FORMAT=json: 输出 JSON 行
///
/// 重复调用时保持首次的订阅者
///
/// # 示例
/// ```no_run
/// use scrap_analytics::logging;
/// logging::init();
/// ```
pub fn init() {
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // 日志写 stderr, stdout 留给 CLI 的 JSON 输出
    let result = if json {
        fmt()
            .json()
            .with_env_filter(env_filter())
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        fmt()
            .with_env_filter(env_filter())
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("日志系统已初始化，跳过");
    }
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
