// ==========================================
// 作业日志追踪系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 供 HTTP 处理器调用
// ==========================================

pub mod config_api;
pub mod error;
pub mod import_api;
pub mod work_log_api;

// 重导出核心类型
pub use config_api::{ConfigApi, ConfigItem};
pub use error::{ApiError, ApiResult};
pub use import_api::{DefaultWorkLogImporter, ImportApi};
pub use work_log_api::WorkLogApi;
