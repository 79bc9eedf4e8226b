// ==========================================
// 作业日志追踪系统 - 数据范围探测
// ==========================================
// 职责: 确定最后数据行与最后表头列
// 约定: 行向后扫描 (上限 max_scan_rows), 列向前扫描
//       (连续 blank_run_threshold 个空表头即停, 上限 max_scan_cols)
// ==========================================

use crate::importer::layout::SheetLayout;
use crate::importer::workbook::SheetGrid;
use tracing::debug;

/// 数据范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataExtent {
    pub last_row: Option<u32>,
    pub last_header_col: Option<u32>,
}

pub fn detect_extent(sheet: &SheetGrid, layout: &SheetLayout) -> DataExtent {
    let extent = DataExtent {
        last_row: detect_last_data_row(sheet, layout),
        last_header_col: detect_last_header_col(sheet, layout),
    };
    debug!(
        sheet = %sheet.name(),
        last_row = ?extent.last_row,
        last_header_col = ?extent.last_header_col,
        "数据范围探测完成"
    );
    extent
}

/// 行是否为完整数据行 (时间/颜色/行级代码均非空白)
pub fn is_data_row(sheet: &SheetGrid, layout: &SheetLayout, row: u32) -> bool {
    let has_time = !sheet.cell(row, layout.datetime_col).is_blank();
    let has_color = !sheet.cell(row, layout.color_col).is_blank();
    let has_code = layout
        .row_code_col
        .map_or(true, |col| !sheet.cell(row, col).is_blank());
    has_time && has_color && has_code
}

/// 最后数据行
///
/// 从 min(物理最后行, 上限) 向后扫描到 start_row, 首个完整数据行即结果
pub fn detect_last_data_row(sheet: &SheetGrid, layout: &SheetLayout) -> Option<u32> {
    let physical_last = sheet.last_row()?;
    let cap = layout.max_scan_rows.checked_sub(1)?;
    let upper = physical_last.min(cap);
    if upper < layout.start_row {
        return None;
    }

    (layout.start_row..=upper)
        .rev()
        .find(|&row| is_data_row(sheet, layout, row))
}

/// 最后表头列
///
/// 从 quantity_start_col 向前扫描, 连续空白达到阈值即停
pub fn detect_last_header_col(sheet: &SheetGrid, layout: &SheetLayout) -> Option<u32> {
    let cap = layout.max_scan_cols.checked_sub(1)?;
    let upper = layout.quantity_end_col.min(cap);

    let mut last_non_blank = None;
    let mut blank_run = 0;
    for col in layout.quantity_start_col..=upper {
        if sheet.cell(layout.code_header_row, col).is_empty() {
            blank_run += 1;
            if blank_run >= layout.blank_run_threshold {
                break;
            }
        } else {
            blank_run = 0;
            last_non_blank = Some(col);
        }
    }
    last_non_blank
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::cell_value::SheetCell;

    fn data_row(sheet: SheetGrid, row: u32) -> SheetGrid {
        partial_row(sheet, row).with_cell(row, 6, SheetCell::Text(format!("P{}", row)))
    }

    /// 时间 + 颜色, 无行级产品代码
    fn partial_row(sheet: SheetGrid, row: u32) -> SheetGrid {
        sheet
            .with_cell(row, 2, SheetCell::DateTime(0.5))
            .with_cell(row, 1, SheetCell::Text("RED".into()))
    }

    #[test]
    fn test_last_row_ignores_partial_rows() {
        let layout = SheetLayout::v2();
        let mut sheet = SheetGrid::new("main");
        for row in 7..=10 {
            sheet = data_row(sheet, row);
        }
        // 只有颜色, 没有时间
        sheet = sheet.with_cell(15, 1, SheetCell::Text("BLUE".into()));

        assert_eq!(detect_last_data_row(&sheet, &layout), Some(10));
    }

    #[test]
    fn test_last_row_respects_cap() {
        let layout = SheetLayout::v2();
        let mut sheet = data_row(SheetGrid::new("main"), 7);
        sheet = data_row(sheet, 20);
        sheet = data_row(sheet, 299);
        sheet = data_row(sheet, 300);
        sheet = data_row(sheet, 450);

        assert_eq!(detect_last_data_row(&sheet, &layout), Some(299));

        let mut capped = layout.clone();
        capped.max_scan_rows = 100;
        assert_eq!(detect_last_data_row(&sheet, &capped), Some(20));
    }

    #[test]
    fn test_default_layout_requires_row_code() {
        let layout = SheetLayout::default();
        let sheet = partial_row(data_row(SheetGrid::new("main"), 7), 8);

        assert_eq!(detect_last_data_row(&sheet, &layout), Some(7));
    }

    #[test]
    fn test_layout_without_row_code_column() {
        let mut layout = SheetLayout::v2();
        layout.row_code_col = None;
        let sheet = partial_row(data_row(SheetGrid::new("main"), 7), 8);

        assert_eq!(detect_last_data_row(&sheet, &layout), Some(8));
    }

    #[test]
    fn test_error_time_counts_as_data_row() {
        let layout = SheetLayout::v2();
        let sheet = data_row(data_row(SheetGrid::new("main"), 7), 8)
            .with_cell(8, 2, SheetCell::Error("#N/A".into()));

        assert_eq!(detect_last_data_row(&sheet, &layout), Some(8));
    }

    #[test]
    fn test_last_row_empty_sheet() {
        let layout = SheetLayout::v2();
        assert_eq!(detect_last_data_row(&SheetGrid::new("main"), &layout), None);

        let header_only = SheetGrid::new("main").with_cell(6, 8, SheetCell::Text("A1".into()));
        assert_eq!(detect_last_data_row(&header_only, &layout), None);
    }

    #[test]
    fn test_header_scan_stops_after_blank_run() {
        let layout = SheetLayout::v2();
        let sheet = SheetGrid::new("main")
            .with_cell(6, 8, SheetCell::Text("A1".into()))
            .with_cell(6, 10, SheetCell::Text("B2".into()))
            // 11..=15 连续 5 个空白
            .with_cell(6, 16, SheetCell::Text("STRAY".into()));

        assert_eq!(detect_last_header_col(&sheet, &layout), Some(10));
    }

    #[test]
    fn test_header_scan_tolerates_short_gaps() {
        let layout = SheetLayout::v2();
        let sheet = SheetGrid::new("main")
            .with_cell(6, 8, SheetCell::Text("A1".into()))
            .with_cell(6, 13, SheetCell::Text("C3".into()));

        // 9..=12 仅 4 个空白
        assert_eq!(detect_last_header_col(&sheet, &layout), Some(13));
    }

    #[test]
    fn test_header_scan_respects_cap() {
        let mut layout = SheetLayout::v2();
        layout.quantity_end_col = 400;
        let mut sheet = SheetGrid::new("main");
        for col in 8..=260 {
            sheet.set_cell(6, col, SheetCell::Text(format!("P{}", col)));
        }

        assert_eq!(detect_last_header_col(&sheet, &layout), Some(199));
    }

    #[test]
    fn test_detect_extent() {
        let layout = SheetLayout::v2();
        let sheet = data_row(SheetGrid::new("main"), 9).with_cell(6, 8, SheetCell::Text("A1".into()));
        assert_eq!(
            detect_extent(&sheet, &layout),
            DataExtent {
                last_row: Some(9),
                last_header_col: Some(8),
            }
        );
    }
}
