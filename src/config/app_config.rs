// ==========================================
// 作业日志追踪系统 - 启动配置
// ==========================================
// 来源: 环境变量
// - WORKLOG_BIND_ADDR: 监听地址 (默认 0.0.0.0:8080)
// - WORKLOG_DB_PATH: 数据库路径 (默认用户数据目录)
// - WORKLOG_LOG_FORMAT: json | text (默认 text)
// - WORKLOG_MAX_UPLOAD_MB: 上传大小上限 (默认 20)
// ==========================================

use std::path::PathBuf;

pub const ENV_BIND_ADDR: &str = "WORKLOG_BIND_ADDR";
pub const ENV_DB_PATH: &str = "WORKLOG_DB_PATH";
pub const ENV_LOG_FORMAT: &str = "WORKLOG_LOG_FORMAT";
pub const ENV_MAX_UPLOAD_MB: &str = "WORKLOG_MAX_UPLOAD_MB";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;
const DB_FILE_NAME: &str = "worklog.db";
const DATA_DIR_NAME: &str = "worklog-tracker";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn from_param(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// 启动配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub db_path: String,
    pub log_format: LogFormat,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// 从环境变量读取配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置 (空值视为未设置)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let max_upload_mb = read(ENV_MAX_UPLOAD_MB)
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|mb| *mb > 0)
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        Self {
            bind_addr: read(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_path: read(ENV_DB_PATH).unwrap_or_else(get_default_db_path),
            log_format: read(ENV_LOG_FORMAT)
                .map(|v| LogFormat::from_param(&v))
                .unwrap_or_default(),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        }
    }
}

/// 获取默认数据库路径
///
/// 优先用户数据目录 (worklog-tracker/worklog.db), 取不到时回退到当前目录
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join(DATA_DIR_NAME);
        // 目录创建失败时回退当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}
