// ==========================================
// 作业日志追踪系统 - 导入布局读取 Trait
// ==========================================
// 职责: 定义导入模块所需的布局读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::layout::SheetLayout;
use std::sync::Arc;

// ==========================================
// ImportLayoutReader Trait
// ==========================================
// 用途: 导入模块获取当前表格布局
// 实现者: ConfigManager（从 config_kv 表读取）、SheetLayout（固定布局）
pub trait ImportLayoutReader: Send + Sync {
    /// 获取当前生效的表格布局
    ///
    /// # 返回
    /// - Ok(SheetLayout): 自定义布局 > 指定版本预设 > 默认 (v2)
    /// - Err: 配置存在但无法解析
    fn get_sheet_layout(&self) -> ImportResult<SheetLayout>;
}

/// 固定布局
impl ImportLayoutReader for SheetLayout {
    fn get_sheet_layout(&self) -> ImportResult<SheetLayout> {
        Ok(self.clone())
    }
}

impl<T: ImportLayoutReader + ?Sized> ImportLayoutReader for Arc<T> {
    fn get_sheet_layout(&self) -> ImportResult<SheetLayout> {
        (**self).get_sheet_layout()
    }
}
