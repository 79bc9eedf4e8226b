// ==========================================
// 作业日志追踪系统 - 导入结果
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个主数据表的处理统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTally {
    pub sheet_index: usize,
    pub sheet_name: String,
    pub processed: usize,
    pub error_count: usize,
}

/// 导入结果
///
/// 序列化示例:
/// `{"success":true,"message":"...","totalProcessed":3,"errors":[],"sheet1Processed":2,"sheet2Processed":1}`
/// (仅当存在多个主数据表时输出 sheetNProcessed)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
    pub total_processed: usize,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub import_id: String,
    #[serde(default)]
    pub elapsed_ms: u64,
    #[serde(skip)]
    pub sheets: Vec<SheetTally>,
    #[serde(flatten)]
    pub sheet_counts: BTreeMap<String, usize>,
}

impl ImportOutcome {
    /// 汇总各工作表统计
    pub fn completed(
        import_id: String,
        sheets: Vec<SheetTally>,
        errors: Vec<String>,
        warnings: Vec<String>,
        elapsed_ms: u64,
    ) -> Self {
        let total_processed = sheets.iter().map(|s| s.processed).sum();
        let sheet_counts = if sheets.len() > 1 {
            sheets
                .iter()
                .enumerate()
                .map(|(i, s)| (format!("sheet{}Processed", i + 1), s.processed))
                .collect()
        } else {
            BTreeMap::new()
        };

        Self {
            success: true,
            message: format!("成功处理 {} 条记录", total_processed),
            total_processed,
            errors,
            warnings,
            import_id,
            elapsed_ms,
            sheets,
            sheet_counts,
        }
    }

    /// 整批失败
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
