// ==========================================
// 作业日志追踪系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、请求/结果结构
// 红线: 不含数据访问逻辑
// ==========================================

pub mod datetime_fmt;
pub mod import;
pub mod types;
pub mod work_log;

// 重导出核心类型
pub use import::{ImportOutcome, SheetTally};
pub use types::{SortDirection, SortField, WorkStatus};
pub use work_log::{
    CreateWorkLogRequest, NewWorkLog, StatusUpdateRequest, UpdateWorkLogRequest, WorkLog,
    WorkLogFilter, WorkLogPage, WorkLogQuery, WorkLogSort, WorkLogView,
};
