// ==========================================
// 作业日志追踪系统 - 配置层
// ==========================================
// 职责: 启动配置 (环境变量) 与运行期配置 (config_kv 表)
// ==========================================

pub mod app_config;
pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置类型
pub use app_config::{get_default_db_path, AppConfig, LogFormat};
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportLayoutReader;
