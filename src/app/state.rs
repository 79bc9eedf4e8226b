// ==========================================
// 作业日志追踪系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ConfigApi, ImportApi, WorkLogApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version};
use crate::notify::events::WorkLogEventPublisher;
use crate::notify::hub::NotificationHub;
use crate::repository::work_log_repo::WorkLogRepository;

/// 应用状态
///
/// 包含所有API实例和共享资源, 作为 axum 路由状态 (克隆开销为若干 Arc)
#[derive(Clone)]
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 作业日志API
    pub work_log_api: Arc<WorkLogApi>,

    /// 表格导入API
    pub import_api: Arc<ImportApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,

    /// 推送中心
    pub hub: Arc<NotificationHub>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并建表
    /// 2. 初始化Repository与配置管理器
    /// 3. 创建推送中心与所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let version = read_schema_version(&conn).map_err(|e| format!("读取schema版本失败: {}", e))?;
        tracing::info!(schema_version = ?version, "数据库已就绪");

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let work_log_repo = Arc::new(WorkLogRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn).map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 推送中心
        // ==========================================
        let hub = Arc::new(NotificationHub::default());
        let publisher: Arc<dyn WorkLogEventPublisher> = hub.clone();

        // ==========================================
        // 创建API实例
        // ==========================================
        let work_log_api = Arc::new(WorkLogApi::new(work_log_repo.clone(), publisher.clone()));
        let import_api = Arc::new(ImportApi::with_defaults(
            work_log_repo,
            config_manager.clone(),
            publisher,
        ));
        let config_api = Arc::new(ConfigApi::new(config_manager));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            work_log_api,
            import_api,
            config_api,
            hub,
        })
    }
}
