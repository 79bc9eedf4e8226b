// ==========================================
// 作业日志追踪系统 - 基准日期解析
// ==========================================
// 职责: 读取品名表中的基准日期单元格
// 约定: 永不失败; 缺失/空白/非日期时回退为当天并给出警告
// ==========================================

use crate::importer::cell_value::SheetCell;
use crate::importer::datetime_combiner::excel_serial_to_date;
use crate::importer::workbook::{column_letter, SheetGrid};
use chrono::NaiveDate;
use tracing::{debug, warn};

const TEXT_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y.%m.%d", "%y.%m.%d", "%Y/%m/%d"];

/// 基准日期解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDate {
    pub date: NaiveDate,
    /// 回退为当天时的警告
    pub warning: Option<String>,
}

impl BaseDate {
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// 解析基准日期
///
/// # 参数
/// - sheet: 基准日期所在工作表 (None 表示工作表缺失)
/// - row/col: 单元格位置
/// - today: 回退日期
pub fn resolve_base_date(sheet: Option<&SheetGrid>, row: u32, col: u32, today: NaiveDate) -> BaseDate {
    let position = format!("{}{}", column_letter(col), row + 1);

    let Some(sheet) = sheet else {
        return fallback(today, format!("基准日期所在工作表缺失, 使用当前日期 {}", today));
    };

    let cell = sheet.cell(row, col);
    if cell.is_empty() {
        return fallback(
            today,
            format!("基准日期单元格 {} 为空, 使用当前日期 {}", position, today),
        );
    }

    match cell_to_date(cell) {
        Some(date) => {
            debug!(%position, %date, "基准日期解析成功");
            BaseDate {
                date,
                warning: None,
            }
        }
        None => fallback(
            today,
            format!(
                "基准日期单元格 {} 不是有效日期 ({}), 使用当前日期 {}",
                position,
                cell.as_display_string(),
                today
            ),
        ),
    }
}

fn cell_to_date(cell: &SheetCell) -> Option<NaiveDate> {
    if let Some(serial) = cell.numeric_value() {
        return excel_serial_to_date(serial);
    }

    let text = cell.as_trimmed_string();
    let date_part = text.split('T').next().unwrap_or_default();
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn fallback(today: NaiveDate, message: String) -> BaseDate {
    warn!("{}", message);
    BaseDate {
        date: today,
        warning: Some(message),
    }
}
