// ==========================================
// 作业日志追踪系统 - HTTP 处理器（按域拆分）
// ==========================================
// 职责: HTTP 接口定义, 连接客户端与后端 API
// ==========================================

mod common;
mod config;
mod events;
mod import;
mod work_log;

pub use common::ErrorResponse;
pub use config::*;
pub use events::*;
pub use import::*;
pub use work_log::*;
