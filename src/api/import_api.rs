// ==========================================
// 作业日志追踪系统 - 表格导入 API
// ==========================================
// 职责: 封装作业日志表格导入; 导入完成后发布推送事件
// 说明: 导入为 CPU/IO 密集, 在阻塞线程池中执行
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::domain::import::ImportOutcome;
use crate::importer::{WorkLogImporter, WorkLogImporterImpl};
use crate::notify::events::{WorkLogEvent, WorkLogEventPublisher};
use crate::repository::work_log_repo::WorkLogRepository;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// 生产环境使用的导入器类型
pub type DefaultWorkLogImporter = WorkLogImporterImpl<Arc<WorkLogRepository>, Arc<ConfigManager>>;

// ==========================================
// ImportApi - 表格导入 API
// ==========================================
pub struct ImportApi {
    importer: Arc<dyn WorkLogImporter>,
    publisher: Arc<dyn WorkLogEventPublisher>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    ///
    /// # 参数
    /// - importer: 作业日志导入器
    /// - publisher: 事件发布者
    pub fn new(importer: Arc<dyn WorkLogImporter>, publisher: Arc<dyn WorkLogEventPublisher>) -> Self {
        Self { importer, publisher }
    }

    /// 由仓储与配置管理器组装默认导入器
    pub fn with_defaults(
        repo: Arc<WorkLogRepository>,
        config_manager: Arc<ConfigManager>,
        publisher: Arc<dyn WorkLogEventPublisher>,
    ) -> Self {
        let importer: DefaultWorkLogImporter = WorkLogImporterImpl::new(repo, config_manager);
        Self::new(Arc::new(importer), publisher)
    }

    /// 导入上传的表格内容
    ///
    /// # 参数
    /// - file_name: 原始文件名
    /// - bytes: xlsx 内容
    /// - car_model: 车型标签
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 导入完成 (可能含逐条错误)
    /// - Err(ApiError::UploadRejected): 文件为空/无法解析/工作表缺失
    /// - Err(ApiError::ImportError): 读取失败等内部错误
    pub async fn upload(
        &self,
        file_name: String,
        bytes: Vec<u8>,
        car_model: String,
    ) -> ApiResult<ImportOutcome> {
        let importer = self.importer.clone();
        let label = car_model.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            importer.import_workbook(&file_name, &bytes, &label)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "导入任务异常终止");
            ApiError::InternalError(format!("导入任务异常终止: {}", e))
        })??;

        self.announce(&outcome, car_model);
        Ok(outcome)
    }

    /// 从服务器本地路径导入
    pub async fn import_from_path(&self, path: PathBuf, car_model: String) -> ApiResult<ImportOutcome> {
        let importer = self.importer.clone();
        let label = car_model.clone();

        let outcome = tokio::task::spawn_blocking(move || importer.import_from_path(&path, &label))
            .await
            .map_err(|e| ApiError::InternalError(format!("导入任务异常终止: {}", e)))??;

        self.announce(&outcome, car_model);
        Ok(outcome)
    }

    fn announce(&self, outcome: &ImportOutcome, car_model: String) {
        info!(
            import_id = %outcome.import_id,
            total = outcome.total_processed,
            errors = outcome.error_count(),
            elapsed_ms = outcome.elapsed_ms,
            "表格导入完成"
        );
        self.publisher.publish(WorkLogEvent::Imported {
            import_id: outcome.import_id.clone(),
            car_model,
            total_processed: outcome.total_processed,
            error_count: outcome.error_count(),
        });
    }
}
