// ==========================================
// 作业日志追踪系统 - 日期时间格式
// ==========================================
// 显示格式: yy.MM.dd HH:mm
// ISO 格式: yyyy-MM-ddTHH:mm:ss (JSON 序列化)
// 存储格式: yyyy-MM-dd HH:MM:SS (SQLite TEXT, 可按字典序比较)
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub const DISPLAY_FORMAT: &str = "%y.%m.%d %H:%M";
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACCEPTED_FORMATS: [&str; 6] = [
    ISO_FORMAT,
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    STORAGE_FORMAT,
    "%Y-%m-%d %H:%M",
    DISPLAY_FORMAT,
];

pub fn format_display(dt: &NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

pub fn format_iso(dt: &NaiveDateTime) -> String {
    dt.format(ISO_FORMAT).to_string()
}

pub fn format_storage(dt: &NaiveDateTime) -> String {
    dt.format(STORAGE_FORMAT).to_string()
}

/// 解析日期时间, 接受 ISO / 存储 / 显示格式; 失败返回 None
pub fn parse_flexible(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

/// 解析日期 (yyyy-MM-dd 或带时间的字符串的日期部分)
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_flexible(trimmed).map(|dt| dt.date()))
}

/// 某日的完整时间范围 00:00:00 ~ 23:59:59
pub fn day_range(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    let end = date.and_hms_opt(23, 59, 59).unwrap_or(start);
    (start, end)
}

/// serde: NaiveDateTime <-> ISO 字符串
pub mod iso {
    use super::{format_iso, parse_flexible};
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_iso(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_flexible(&raw).ok_or_else(|| de::Error::custom(format!("无效的日期时间: {}", raw)))
    }
}

/// serde: Option<NaiveDateTime> <-> ISO 字符串 / null
pub mod iso_option {
    use super::{format_iso, parse_flexible};
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        dt: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => serializer.serialize_str(&format_iso(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => parse_flexible(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("无效的日期时间: {}", raw))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_formats() {
        let value = dt(2024, 3, 5, 9, 7, 0);
        assert_eq!(format_display(&value), "24.03.05 09:07");
        assert_eq!(format_iso(&value), "2024-03-05T09:07:00");
        assert_eq!(format_storage(&value), "2024-03-05 09:07:00");
    }

    #[test]
    fn test_parse_flexible() {
        let expected = dt(2024, 3, 5, 9, 7, 0);
        assert_eq!(parse_flexible("2024-03-05T09:07:00"), Some(expected));
        assert_eq!(parse_flexible("2024-03-05T09:07"), Some(expected));
        assert_eq!(parse_flexible("24.03.05 09:07"), Some(expected));
        assert_eq!(parse_flexible("2024-03-05 09:07:00"), Some(expected));
        assert_eq!(parse_flexible("yesterday"), None);
        assert_eq!(parse_flexible(""), None);
    }

    #[test]
    fn test_day_range() {
        let (start, end) = day_range(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(start, dt(2024, 3, 5, 0, 0, 0));
        assert_eq!(end, dt(2024, 3, 5, 23, 59, 59));
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date("2024-03-05"), Some(expected));
        assert_eq!(parse_date("2024-03-05T10:00:00"), Some(expected));
        assert_eq!(parse_date("03/05"), None);
    }
}
