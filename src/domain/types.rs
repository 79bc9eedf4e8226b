// ==========================================
// 作业日志追踪系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 作业状态 (Work Status)
// ==========================================
// 由 completed_at 是否为空派生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Completed,
    Incomplete,
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkStatus::Completed => write!(f, "completed"),
            WorkStatus::Incomplete => write!(f, "incomplete"),
        }
    }
}

impl WorkStatus {
    /// 从字符串解析 (大小写不敏感), 未知值返回 None
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" => Some(WorkStatus::Completed),
            "incomplete" => Some(WorkStatus::Incomplete),
            _ => None,
        }
    }
}

// ==========================================
// 排序字段 (白名单)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    WorkDatetime,
    CarModel,
    ProductColor,
    ProductCode,
    ProductName,
    Quantity,
    CreatedAt,
    CompletedAt,
}

impl SortField {
    /// 解析排序参数, 接受列名或 camelCase 字段名; 不在白名单内时回退为作业时间
    pub fn from_param(s: &str) -> Self {
        match s.trim() {
            "wl_work_datetime" | "work_datetime" | "workDatetime" => SortField::WorkDatetime,
            "car_model" | "carModel" => SortField::CarModel,
            "product_color" | "productColor" => SortField::ProductColor,
            "product_code" | "productCode" => SortField::ProductCode,
            "product_name" | "productName" => SortField::ProductName,
            "quantity" => SortField::Quantity,
            "created_at" | "createdAt" => SortField::CreatedAt,
            "completed_at" | "completedAt" => SortField::CompletedAt,
            _ => SortField::WorkDatetime,
        }
    }

    /// 对应的数据库列名
    pub fn column(&self) -> &'static str {
        match self {
            SortField::WorkDatetime => "wl_work_datetime",
            SortField::CarModel => "wl_car_model",
            SortField::ProductColor => "wl_product_color",
            SortField::ProductCode => "wl_product_code",
            SortField::ProductName => "wl_product_name",
            SortField::Quantity => "wl_quantity",
            SortField::CreatedAt => "wl_created_at",
            SortField::CompletedAt => "wl_completed_at",
        }
    }
}

// ==========================================
// 排序方向
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// 解析排序方向, 未知值使用给定默认值
    pub fn from_param(s: Option<&str>, default: SortDirection) -> Self {
        match s.map(|v| v.trim().to_ascii_uppercase()) {
            Some(v) if v == "ASC" => SortDirection::Asc,
            Some(v) if v == "DESC" => SortDirection::Desc,
            _ => default,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_status_parse() {
        assert_eq!(WorkStatus::from_str("Completed"), Some(WorkStatus::Completed));
        assert_eq!(WorkStatus::from_str(" incomplete "), Some(WorkStatus::Incomplete));
        assert_eq!(WorkStatus::from_str("done"), None);
        assert_eq!(WorkStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_sort_field_whitelist() {
        assert_eq!(SortField::from_param("quantity").column(), "wl_quantity");
        assert_eq!(SortField::from_param("carModel"), SortField::CarModel);
        assert_eq!(
            SortField::from_param("1; DROP TABLE work_logs").column(),
            "wl_work_datetime"
        );
    }

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortDirection::from_param(Some("desc"), SortDirection::Asc), SortDirection::Desc);
        assert_eq!(SortDirection::from_param(Some("sideways"), SortDirection::Desc), SortDirection::Desc);
        assert_eq!(SortDirection::from_param(None, SortDirection::Asc).as_sql(), "ASC");
    }
}
