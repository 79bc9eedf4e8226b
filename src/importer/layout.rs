// ==========================================
// 作业日志追踪系统 - 表格布局配置
// ==========================================
// 职责: 以命名的、可替换的结构描述导入表格的固定位置常量
// 说明: 每个支持的表格格式版本对应一个预设 (v1 / v2)
//       所有行列索引均为 0 基
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

// ==========================================
// RowScanMode - 行扫描模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowScanMode {
    /// 顺序扫描, 遇到时间或颜色为空的行即视为数据结束
    StopAtFirstBlank,
    /// 先探测数据范围, 范围内的空行仅跳过并继续
    DetectExtent,
}

// ==========================================
// SheetLayout - 表格布局
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// 布局版本标识
    pub version: String,

    // ===== 工作表 =====
    /// 主数据表索引 (可多个, 依次处理)
    pub main_sheet_indices: Vec<usize>,
    /// 品名/计划表索引 (基准日期与品名所在表)
    pub product_name_sheet_index: usize,

    // ===== 数据区 =====
    pub start_row: u32,
    pub end_row: u32,
    pub datetime_col: u32,
    pub color_col: u32,
    /// 品名列 (位于品名表)
    pub product_name_col: u32,
    pub quantity_start_col: u32,
    pub quantity_end_col: u32,

    // ===== 产品代码 =====
    /// 表头行 (主表), 每个数量列的表头即产品代码
    pub code_header_row: u32,
    /// 备用区: 按位置对应的产品代码列
    pub code_lookup_col: u32,
    pub code_lookup_start_row: u32,
    pub code_lookup_end_row: u32,
    /// 行级产品代码列 (范围探测时要求非空), None 表示不检查
    pub row_code_col: Option<u32>,

    // ===== 基准日期 =====
    pub base_date_row: u32,
    pub base_date_col: u32,

    // ===== 处理策略 =====
    /// 颜色仅保留末尾 N 个字符
    pub color_suffix_len: Option<usize>,
    pub row_scan_mode: RowScanMode,
    pub parallel_rows: bool,

    // ===== 安全上限 =====
    pub max_scan_rows: u32,
    pub max_scan_cols: u32,
    pub blank_run_threshold: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::v2()
    }
}

impl SheetLayout {
    pub const VERSION_V1: &'static str = "v1";
    pub const VERSION_V2: &'static str = "v2";

    /// v1: 顺序扫描, 首个空行即结束
    pub fn v1() -> Self {
        Self {
            version: Self::VERSION_V1.to_string(),
            main_sheet_indices: vec![3],
            product_name_sheet_index: 2,
            start_row: 7,
            end_row: 199,
            datetime_col: 2,
            color_col: 1,
            product_name_col: 4,
            quantity_start_col: 8,
            quantity_end_col: 191,
            code_header_row: 6,
            code_lookup_col: 6,
            code_lookup_start_row: 8,
            code_lookup_end_row: 188,
            row_code_col: None,
            base_date_row: 5,
            base_date_col: 11,
            color_suffix_len: None,
            row_scan_mode: RowScanMode::StopAtFirstBlank,
            parallel_rows: false,
            max_scan_rows: 300,
            max_scan_cols: 200,
            blank_run_threshold: 5,
        }
    }

    /// v2: 同样的位置常量, 范围探测 (含 G 列行级代码) + 并行行处理
    pub fn v2() -> Self {
        Self {
            version: Self::VERSION_V2.to_string(),
            row_code_col: Some(6),
            row_scan_mode: RowScanMode::DetectExtent,
            parallel_rows: true,
            ..Self::v1()
        }
    }

    /// 按版本名获取预设
    pub fn preset(version: &str) -> Option<Self> {
        match version.trim().to_ascii_lowercase().as_str() {
            Self::VERSION_V1 => Some(Self::v1()),
            Self::VERSION_V2 => Some(Self::v2()),
            _ => None,
        }
    }

    /// 导入所需的全部工作表索引 (升序去重)
    pub fn required_sheet_indices(&self) -> Vec<usize> {
        let mut indices = self.main_sheet_indices.clone();
        indices.push(self.product_name_sheet_index);
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    pub fn quantity_columns(&self) -> RangeInclusive<u32> {
        self.quantity_start_col..=self.quantity_end_col
    }

    /// 颜色规范化 (按字符截取末尾 N 位)
    pub fn normalize_color(&self, raw: &str) -> String {
        match self.color_suffix_len {
            Some(n) => {
                let chars: Vec<char> = raw.chars().collect();
                if chars.len() > n {
                    chars[chars.len() - n..].iter().collect()
                } else {
                    raw.to_string()
                }
            }
            None => raw.to_string(),
        }
    }

    /// 布局自洽性检查
    pub fn validate(&self) -> ImportResult<()> {
        let fail = |message: String| {
            Err(ImportError::LayoutConfigError {
                key: self.version.clone(),
                message,
            })
        };

        if self.main_sheet_indices.is_empty() {
            return fail("至少需要一个主数据表".to_string());
        }
        if self.start_row > self.end_row {
            return fail(format!(
                "数据起始行 {} 大于结束行 {}",
                self.start_row, self.end_row
            ));
        }
        if self.quantity_start_col > self.quantity_end_col {
            return fail(format!(
                "数量起始列 {} 大于结束列 {}",
                self.quantity_start_col, self.quantity_end_col
            ));
        }
        if self.code_lookup_start_row > self.code_lookup_end_row {
            return fail("产品代码备用区范围无效".to_string());
        }
        if self.blank_run_threshold == 0 {
            return fail("连续空白阈值必须大于 0".to_string());
        }
        if self.max_scan_rows == 0 || self.max_scan_cols == 0 {
            return fail("扫描上限必须大于 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_share_positions() {
        let v1 = SheetLayout::v1();
        let v2 = SheetLayout::v2();

        assert_eq!(v1.main_sheet_indices, vec![3]);
        assert_eq!(v1.product_name_sheet_index, 2);
        assert_eq!(v1.start_row, v2.start_row);
        assert_eq!(v1.quantity_columns(), 8..=191);
        assert_eq!(v1.row_scan_mode, RowScanMode::StopAtFirstBlank);
        assert_eq!(v2.row_scan_mode, RowScanMode::DetectExtent);
        assert!(v2.parallel_rows);
        assert_eq!(v1.row_code_col, None);
        assert_eq!(v2.row_code_col, Some(v2.code_lookup_col));
        assert_eq!(SheetLayout::default(), v2);
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(SheetLayout::preset(" V1 "), Some(SheetLayout::v1()));
        assert_eq!(SheetLayout::preset("v2"), Some(SheetLayout::v2()));
        assert!(SheetLayout::preset("v9").is_none());
    }

    #[test]
    fn test_required_sheet_indices_dedup() {
        let mut layout = SheetLayout::v1();
        layout.main_sheet_indices = vec![3, 2, 4];
        assert_eq!(layout.required_sheet_indices(), vec![2, 3, 4]);
    }

    #[test]
    fn test_normalize_color_suffix() {
        let mut layout = SheetLayout::v1();
        assert_eq!(layout.normalize_color("NH-731P"), "NH-731P");

        layout.color_suffix_len = Some(3);
        assert_eq!(layout.normalize_color("NH-731P"), "31P");
        assert_eq!(layout.normalize_color("RD"), "RD");
        assert_eq!(layout.normalize_color("흰색펄"), "흰색펄");
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let mut layout = SheetLayout::v2();
        assert!(layout.validate().is_ok());

        layout.start_row = 300;
        assert!(matches!(
            layout.validate(),
            Err(ImportError::LayoutConfigError { .. })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let layout: SheetLayout =
            serde_json::from_str(r#"{"version":"custom","color_suffix_len":3}"#).unwrap();
        assert_eq!(layout.version, "custom");
        assert_eq!(layout.color_suffix_len, Some(3));
        assert_eq!(layout.quantity_start_col, 8);
        assert_eq!(layout.row_scan_mode, RowScanMode::DetectExtent);
    }
}
