// ==========================================
// 作业日志追踪系统 - 应用层
// ==========================================
// 职责: HTTP 集成, 连接客户端与后端
// ==========================================

pub mod http_handlers;
pub mod routes;
pub mod state;

// 重导出
pub use routes::configure_routes;
pub use state::AppState;
