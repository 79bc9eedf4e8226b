// ==========================================
// 作业日志追踪系统 - 日志初始化
// ==========================================
// tracing-subscriber: 文本 (开发) / JSON (日志采集) 两种输出
// 级别由 RUST_LOG 控制, 未设置时使用 DEFAULT_DIRECTIVE
// ==========================================

use crate::config::LogFormat;
use tracing_subscriber::{fmt, EnvFilter};

/// 默认过滤指令: 本 crate info, 依赖库 warn
pub const DEFAULT_DIRECTIVE: &str = "warn,worklog_tracker=info,tower_http=info";

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// 按输出格式初始化全局日志订阅者
///
/// # 参数
/// - format: 输出格式 (WORKLOG_LOG_FORMAT)
///
/// # 示例
/// ```no_run
/// use worklog_tracker::config::LogFormat;
/// worklog_tracker::logging::init_with(LogFormat::Json);
/// ```
pub fn init_with(format: LogFormat) {
    let filter = env_filter(DEFAULT_DIRECTIVE);
    let result = match format {
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .try_init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_target(true)
            .try_init(),
    };

    // 重复初始化 (例如集成测试中) 不视为错误
    if let Err(e) = result {
        eprintln!("日志系统已初始化, 忽略: {}", e);
    }
}

/// 测试环境日志: debug 级别, 输出到测试捕获
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(env_filter("debug"))
        .with_test_writer()
        .try_init();
}
