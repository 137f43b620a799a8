// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 级别: RUST_LOG（默认 info）
// 格式: SHEET_IMPORT_LOG_FORMAT = text | json（默认 text）
// ==========================================

use crate::config::config_keys;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 人类可读文本
    #[default]
    Text,
    /// 每行一个 JSON 对象，附带当前 span（含 import_id）
    Json,
}

impl LogFormat {
    /// 解析格式名（大小写不敏感），未知值返回 None
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "plain" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }

    /// 从 SHEET_IMPORT_LOG_FORMAT 读取，缺失或无法识别时为 Text
    pub fn from_env() -> Self {
        std::env::var(config_keys::LOG_FORMAT)
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// 初始化日志系统（格式取自环境变量）
///
/// 返回是否由本次调用安装了全局订阅者；已安装时不做任何事。
///
/// # 示例
/// ```
/// use sheet_importer::logging;
///
/// logging::init();
/// // 重复调用无副作用
/// assert!(!logging::init());
/// ```
pub fn init() -> bool {
    init_with(LogFormat::from_env())
}

/// 按指定格式初始化日志系统
pub fn init_with(format: LogFormat) -> bool {
    let builder = fmt()
        .with_env_filter(env_filter(DEFAULT_LEVEL))
        .with_target(true);

    // 分批任务运行在阻塞线程池，记录线程 ID 便于区分批次
    match format {
        LogFormat::Text => builder
            .with_thread_ids(true)
            .with_line_number(true)
            .try_init()
            .is_ok(),
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_thread_ids(true)
            .try_init()
            .is_ok(),
    }
}

/// 初始化测试环境的日志系统
///
/// 使用 debug 级别与测试输出捕获，重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
