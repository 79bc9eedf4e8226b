// ==========================================
// 作业日志追踪系统 - 产品代码映射
// ==========================================
// 职责: 数量列索引 -> 产品代码
// 策略: (a) 表头行; (b) 备用区按位置对应 (行偏移 = 列偏移)
//       每列独立求值 (rayon), 结果合并后不可变
// ==========================================

use crate::importer::layout::SheetLayout;
use crate::importer::workbook::SheetGrid;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 产品代码来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSource {
    Header,
    LookupRegion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCodeMap {
    codes: BTreeMap<u32, String>,
}

impl ProductCodeMap {
    /// 构建映射
    ///
    /// 扫描 layout.quantity_columns() 中的每一列, 首个成功的策略生效
    pub fn build(sheet: &SheetGrid, layout: &SheetLayout) -> Self {
        let resolved: Vec<(u32, String, CodeSource)> = layout
            .quantity_columns()
            .into_par_iter()
            .filter_map(|col| {
                resolve_column(sheet, layout, col).map(|(code, source)| (col, code, source))
            })
            .collect();

        let from_lookup = resolved
            .iter()
            .filter(|(_, _, source)| *source == CodeSource::LookupRegion)
            .count();
        let total_cols = layout.quantity_columns().count();
        let unmapped = total_cols.saturating_sub(resolved.len());

        debug!(
            mapped = resolved.len(),
            from_lookup,
            unmapped,
            "产品代码映射构建完成"
        );
        if resolved.is_empty() {
            warn!(sheet = %sheet.name(), "未找到任何产品代码");
        }

        Self {
            codes: resolved
                .into_iter()
                .map(|(col, code, _)| (col, code))
                .collect(),
        }
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, String)>,
    {
        Self {
            codes: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, col: u32) -> Option<&str> {
        self.codes.get(&col).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// 已映射的最大列
    pub fn last_column(&self) -> Option<u32> {
        self.codes.last_key_value().map(|(col, _)| *col)
    }

    pub fn columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.codes.keys().copied()
    }
}

/// 解析单列的产品代码
pub fn resolve_column(sheet: &SheetGrid, layout: &SheetLayout, col: u32) -> Option<(String, CodeSource)> {
    let header = sheet.cell(layout.code_header_row, col).as_trimmed_string();
    if !header.is_empty() {
        return Some((header, CodeSource::Header));
    }

    let offset = col.checked_sub(layout.quantity_start_col)?;
    let lookup_row = layout.code_lookup_start_row.checked_add(offset)?;
    if lookup_row > layout.code_lookup_end_row {
        return None;
    }

    let code = sheet.cell(lookup_row, layout.code_lookup_col).as_trimmed_string();
    if code.is_empty() {
        None
    } else {
        Some((code, CodeSource::LookupRegion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::cell_value::SheetCell;

    fn narrow_layout() -> SheetLayout {
        SheetLayout {
            quantity_start_col: 8,
            quantity_end_col: 12,
            ..SheetLayout::v2()
        }
    }

    #[test]
    fn test_header_row_only() {
        let layout = narrow_layout();
        let sheet = SheetGrid::new("main")
            .with_cell(6, 8, SheetCell::Text("A1".into()))
            .with_cell(6, 9, SheetCell::Text("".into()))
            .with_cell(6, 10, SheetCell::Text("B2".into()));

        let map = ProductCodeMap::build(&sheet, &layout);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(8), Some("A1"));
        assert_eq!(map.get(9), None);
        assert_eq!(map.get(10), Some("B2"));
        assert_eq!(map.columns().collect::<Vec<_>>(), vec![8, 10]);
    }

    #[test]
    fn test_lookup_region_fallback() {
        let layout = narrow_layout();
        // 列 9 -> 偏移 1 -> 备用区第 8 + 1 = 9 行
        let sheet = SheetGrid::new("main")
            .with_cell(6, 8, SheetCell::Text(" A1 ".into()))
            .with_cell(9, 6, SheetCell::Text("Z9".into()))
            .with_cell(8, 6, SheetCell::Text("IGNORED".into()));

        let map = ProductCodeMap::build(&sheet, &layout);
        assert_eq!(map.get(8), Some("A1"));
        assert_eq!(map.get(9), Some("Z9"));
        assert_eq!(
            resolve_column(&sheet, &layout, 9),
            Some(("Z9".to_string(), CodeSource::LookupRegion))
        );
        assert_eq!(map.last_column(), Some(9));
    }

    #[test]
    fn test_lookup_beyond_region_end() {
        let mut layout = narrow_layout();
        layout.code_lookup_end_row = 9;
        let sheet = SheetGrid::new("main").with_cell(10, 6, SheetCell::Text("C3".into()));

        // 列 10 -> 备用区第 10 行, 超出结束行
        assert_eq!(resolve_column(&sheet, &layout, 10), None);
    }

    #[test]
    fn test_numeric_header_code() {
        let layout = narrow_layout();
        let sheet = SheetGrid::new("main").with_cell(6, 11, SheetCell::Number(1001.0));
        let map = ProductCodeMap::build(&sheet, &layout);
        assert_eq!(map.get(11), Some("1001"));
    }
}
