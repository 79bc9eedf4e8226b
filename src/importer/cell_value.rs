// ==========================================
// 作业日志追踪系统 - 单元格值转换
// ==========================================
// 职责: 原始单元格 -> 显示字符串 / 数量 / 空值判断
// 约定: 转换永不失败, 异常路径退化为 "" / 0 / 空
// ==========================================

use crate::importer::datetime_combiner::excel_serial_to_datetime;
use chrono::Timelike;

/// 单元格原始值
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SheetCell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// 日期格式的数值 (日期序列值)
    DateTime(f64),
    Error(String),
    /// 公式及其缓存结果
    Formula { text: String, cached: Box<SheetCell> },
}

/// 缺省单元格 (稀疏表格中不存在的位置)
pub static EMPTY_CELL: SheetCell = SheetCell::Empty;

impl SheetCell {
    /// 显示字符串
    ///
    /// - 整数值不带小数点 (42.0 -> "42")
    /// - 日期格式数值 -> `YYYY-MM-DDTHH:MM[:SS]`
    /// - 公式按缓存结果转换, 缓存为空或错误时返回公式文本
    pub fn as_display_string(&self) -> String {
        match self {
            SheetCell::Empty | SheetCell::Error(_) => String::new(),
            SheetCell::Text(text) => text.clone(),
            SheetCell::Bool(value) => value.to_string(),
            SheetCell::Number(value) => format_number(*value),
            SheetCell::DateTime(serial) => format_date_serial(*serial),
            SheetCell::Formula { text, cached } => match cached.as_ref() {
                SheetCell::Empty | SheetCell::Error(_) => text.clone(),
                other => other.as_display_string(),
            },
        }
    }

    /// 去除首尾空白的显示字符串 (产品代码用)
    pub fn as_trimmed_string(&self) -> String {
        self.as_display_string().trim().to_string()
    }

    /// 数量
    ///
    /// 数值向零截断; 否则依次尝试整数/小数解析; 无法解析返回 0
    pub fn as_quantity(&self) -> i32 {
        if let Some(value) = self.numeric_value() {
            return truncate_to_i32(value);
        }

        let text = self.as_display_string();
        let text = text.trim();
        if text.is_empty() {
            return 0;
        }
        if let Ok(value) = text.parse::<i32>() {
            return value;
        }
        text.parse::<f64>().map(truncate_to_i32).unwrap_or(0)
    }

    /// 数值 (含日期格式数值与公式数值结果)
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            SheetCell::Number(value) | SheetCell::DateTime(value) => Some(*value),
            SheetCell::Formula { cached, .. } => cached.numeric_value(),
            _ => None,
        }
    }

    /// 是否为空
    ///
    /// 数值/布尔永不为空 (数值 0 不是空); 错误值视为空
    pub fn is_empty(&self) -> bool {
        match self {
            SheetCell::Empty | SheetCell::Error(_) => true,
            SheetCell::Text(text) => text.trim().is_empty(),
            SheetCell::Number(_) | SheetCell::Bool(_) | SheetCell::DateTime(_) => false,
            SheetCell::Formula { cached, .. } => cached.is_empty(),
        }
    }

    /// 是否为空白单元格
    ///
    /// 仅空单元格与纯空白文本; 错误值不是空白 (交由时间解析收集错误)
    pub fn is_blank(&self) -> bool {
        match self {
            SheetCell::Empty => true,
            SheetCell::Text(text) => text.trim().is_empty(),
            SheetCell::Formula { cached, .. } => cached.is_blank(),
            SheetCell::Number(_) | SheetCell::Bool(_) | SheetCell::DateTime(_) | SheetCell::Error(_) => false,
        }
    }
}

fn truncate_to_i32(value: f64) -> i32 {
    if value.is_finite() {
        value.trunc() as i32
    } else {
        0
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn format_date_serial(serial: f64) -> String {
    match excel_serial_to_datetime(serial) {
        Some(dt) if dt.second() == 0 => dt.format("%Y-%m-%dT%H:%M").to_string(),
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => format_number(serial),
    }
}
