// ==========================================
// 作业日志追踪系统 - 作业日志导入 Trait
// ==========================================
// 职责: 定义导入接口与持久化接口（不包含实现）
// 说明: Importer 定义 WorkLogSink, Repository 实现 (依赖倒置)
// ==========================================

use crate::domain::import::ImportOutcome;
use crate::domain::work_log::NewWorkLog;
use crate::importer::error::ImportResult;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

// ==========================================
// WorkLogSink Trait
// ==========================================
// 用途: 导入器逐条写入作业日志
// 实现者: WorkLogRepository
pub trait WorkLogSink: Send + Sync {
    /// 写入一条作业日志
    ///
    /// # 返回
    /// - Ok(Some(id)): 写入成功
    /// - Ok(None): 未返回主键, 视为该条失败
    /// - Err: 该条失败 (不中止整批)
    fn create_record(&self, record: &NewWorkLog) -> Result<Option<i64>, Box<dyn Error + Send + Sync>>;
}

impl<T: WorkLogSink + ?Sized> WorkLogSink for Arc<T> {
    fn create_record(&self, record: &NewWorkLog) -> Result<Option<i64>, Box<dyn Error + Send + Sync>> {
        (**self).create_record(record)
    }
}

// ==========================================
// WorkLogImporter Trait
// ==========================================
// 用途: 作业日志导入主接口
// 实现者: WorkLogImporterImpl
pub trait WorkLogImporter: Send + Sync {
    /// 从上传内容导入
    ///
    /// # 参数
    /// - file_name: 原始文件名 (仅用于日志)
    /// - bytes: xlsx 内容
    /// - car_model: 车型标签, 对整批记录生效
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 到达完成状态 (errors 可能非空)
    /// - Err: 文件为空/无法解析/工作表缺失/布局配置错误
    fn import_workbook(&self, file_name: &str, bytes: &[u8], car_model: &str) -> ImportResult<ImportOutcome>;

    /// 从文件路径导入 (读取失败为整批错误)
    fn import_from_path(&self, path: &Path, car_model: &str) -> ImportResult<ImportOutcome>;
}
