// ==========================================
// 作业日志追踪系统 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 生产作业记录 (手工录入/表格导入/实时推送)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 生产表格
pub mod importer;

// 配置层 - 启动配置与运行期配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 推送层 - 变更事件
pub mod notify;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{ImportOutcome, NewWorkLog, WorkLog, WorkLogPage, WorkLogView, WorkStatus};

// 导入
pub use importer::{SheetLayout, WorkLogImporter, WorkLogImporterImpl};

// API
pub use api::{ConfigApi, ImportApi, WorkLogApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "作业日志追踪系统";
