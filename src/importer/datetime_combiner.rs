// ==========================================
// 作业日志追踪系统 - 日期/时间合成
// ==========================================
// 职责: 表格日期序列值 <-> 日历日期/时间
// 约定: 1900 日期系统 (含 1900-02-29 兼容缺陷)
// ==========================================

use crate::importer::cell_value::SheetCell;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// 可接受的文本时间格式
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// 日期序列值 -> 日期时间 (时间部分四舍五入到秒)
///
/// 序列值 < 61 时以 1899-12-31 为 1 号起点;
/// 之后跳过不存在的 1900-02-29, 以 1899-12-30 为零点
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let whole_days = serial.floor();
    let epoch = if whole_days < 61.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let date = epoch.checked_add_signed(Duration::try_days(whole_days as i64)?)?;
    let seconds = ((serial - whole_days) * SECONDS_PER_DAY).round() as i64;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_seconds(seconds)?)
}

/// 日期序列值 -> 日期
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    excel_serial_to_datetime(serial).map(|dt| dt.date())
}

/// 基准日期 + 时间值 -> 作业时间
///
/// # 参数
/// - base: 基准日期, 为 None 时结果为 None
/// - time_value: 整数部分为追加天数, 小数部分为一天内的时刻
///
/// # 返回
/// - 分钟四舍五入 (60 分进位到小时), 秒固定为 0; 24:00 顺延到次日
pub fn combine_excel_date_time(base: Option<NaiveDate>, time_value: f64) -> Option<NaiveDateTime> {
    let base = base?;
    if !time_value.is_finite() {
        return None;
    }

    let whole_days = time_value.floor();
    let mut date = base;
    if whole_days > 0.0 {
        date = date.checked_add_signed(Duration::try_days(whole_days as i64)?)?;
    }

    let total_hours = (time_value - whole_days) * 24.0;
    let mut hours = total_hours.trunc() as u32;
    let mut minutes = ((total_hours - hours as f64) * 60.0).round() as u32;

    if minutes == 60 {
        hours += 1;
        minutes = 0;
    }
    if hours >= 24 {
        date = date.succ_opt()?;
        hours -= 24;
    }

    date.and_hms_opt(hours, minutes, 0)
}

/// 文本形式的时间 (`<date>T<time>` 或裸时间) + 基准日期
pub fn combine_textual_time(base: NaiveDate, text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    let time_part = match trimmed.find('T') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    };
    parse_time_of_day(time_part).map(|time| base.and_time(time))
}

fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text.trim(), fmt).ok())
}

/// 从时间单元格提取作业时间
///
/// 数值 (含日期格式数值) 走序列值路径, 其余按文本路径解析
pub fn extract_work_datetime(cell: &SheetCell, base: NaiveDate) -> Option<NaiveDateTime> {
    if let Some(value) = cell.numeric_value() {
        return combine_excel_date_time(Some(base), value);
    }

    let text = cell.as_display_string();
    if text.trim().is_empty() {
        return None;
    }
    combine_textual_time(base, &text)
}
