// ==========================================
// 作业日志追踪系统 - 作业日志实体
// ==========================================
// 职责: 作业日志实体、新建记录、请求/查询参数
// 红线: 不含数据访问逻辑
// ==========================================

use crate::domain::datetime_fmt;
use crate::domain::types::{SortDirection, SortField, WorkStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// WorkLog - 已持久化的作业日志
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLog {
    pub id: i64,
    #[serde(with = "datetime_fmt::iso")]
    pub work_datetime: NaiveDateTime,
    pub car_model: String,
    pub product_color: String,
    pub product_code: String,
    pub product_name: String,
    pub quantity: i32,
    #[serde(with = "datetime_fmt::iso_option", default)]
    pub completed_at: Option<NaiveDateTime>,
    /// 完成操作的客户端标识
    #[serde(default)]
    pub completed_by: Option<String>,
    #[serde(with = "datetime_fmt::iso")]
    pub created_at: NaiveDateTime,
}

impl WorkLog {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn status(&self) -> WorkStatus {
        if self.is_completed() {
            WorkStatus::Completed
        } else {
            WorkStatus::Incomplete
        }
    }

    /// 显示格式的作业时间 (yy.MM.dd HH:mm)
    pub fn formatted_work_datetime(&self) -> String {
        datetime_fmt::format_display(&self.work_datetime)
    }
}

/// 对外返回的作业日志 (附带派生字段)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogView {
    #[serde(flatten)]
    pub work_log: WorkLog,
    pub completed: bool,
    pub formatted_work_datetime: String,
}

impl From<WorkLog> for WorkLogView {
    fn from(work_log: WorkLog) -> Self {
        Self {
            completed: work_log.is_completed(),
            formatted_work_datetime: work_log.formatted_work_datetime(),
            work_log,
        }
    }
}

// ==========================================
// NewWorkLog - 待写入的作业日志
// ==========================================
// 导入时: quantity > 0 且产品代码非空才会构造
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkLog {
    #[serde(with = "datetime_fmt::iso")]
    pub work_datetime: NaiveDateTime,
    pub car_model: String,
    pub product_color: String,
    pub product_code: String,
    pub product_name: String,
    pub quantity: i32,
}

// ==========================================
// 请求参数
// ==========================================

/// 新建请求 (作业时间为字符串, 解析失败时使用当前时间)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateWorkLogRequest {
    pub work_datetime: Option<String>,
    pub car_model: String,
    pub product_color: String,
    pub product_code: String,
    pub product_name: String,
    pub quantity: Option<i32>,
}

/// 更新请求 (None 字段保持原值; 作业时间解析失败时保持原值)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateWorkLogRequest {
    pub work_datetime: Option<String>,
    pub car_model: Option<String>,
    pub product_color: Option<String>,
    pub product_code: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
}

/// 完成状态更新请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusUpdateRequest {
    pub completed: bool,
    pub completed_by: Option<String>,
}

// ==========================================
// 查询参数
// ==========================================

/// 过滤条件 (均为可选, 组合为 AND)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkLogFilter {
    pub car_model: Option<String>,
    pub product_code: Option<String>,
    pub status: Option<WorkStatus>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

/// 排序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkLogSort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// 分页查询
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkLogQuery {
    pub filter: WorkLogFilter,
    pub sort: WorkLogSort,
    /// 1 基页码
    pub page: u32,
    pub size: u32,
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogPage {
    pub work_logs: Vec<WorkLogView>,
    pub total_count: i64,
    pub page: u32,
    pub size: u32,
    pub total_pages: u32,
}

impl WorkLogPage {
    pub fn new(work_logs: Vec<WorkLog>, total_count: i64, page: u32, size: u32) -> Self {
        let total_pages = if size == 0 || total_count <= 0 {
            0
        } else {
            ((total_count as u64 + size as u64 - 1) / size as u64) as u32
        };
        Self {
            work_logs: work_logs.into_iter().map(WorkLogView::from).collect(),
            total_count,
            page,
            size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> WorkLog {
        WorkLog {
            id: 7,
            work_datetime: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            car_model: "SONATA".to_string(),
            product_color: "NH731P".to_string(),
            product_code: "A1".to_string(),
            product_name: "FRONT DOOR".to_string(),
            quantity: 4,
            completed_at: None,
            completed_by: None,
            created_at: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_status_derivation() {
        let mut log = sample();
        assert_eq!(log.status(), WorkStatus::Incomplete);
        log.completed_at = Some(log.created_at);
        assert_eq!(log.status(), WorkStatus::Completed);
    }

    #[test]
    fn test_view_serialization() {
        let view = WorkLogView::from(sample());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["workDatetime"], "2024-03-15T09:30:00");
        assert_eq!(json["formattedWorkDatetime"], "24.03.15 09:30");
        assert_eq!(json["completed"], false);
        assert_eq!(json["carModel"], "SONATA");
        assert!(json["completedAt"].is_null());
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateWorkLogRequest =
            serde_json::from_str(r#"{"carModel":"K5","productCode":"B2"}"#).unwrap();
        assert_eq!(req.car_model, "K5");
        assert!(req.quantity.is_none());
        assert!(req.work_datetime.is_none());
        assert_eq!(req.product_color, "");
    }

    #[test]
    fn test_page_total_pages() {
        assert_eq!(WorkLogPage::new(vec![], 0, 1, 10).total_pages, 0);
        assert_eq!(WorkLogPage::new(vec![], 10, 1, 10).total_pages, 1);
        assert_eq!(WorkLogPage::new(vec![], 11, 1, 10).total_pages, 2);
    }
}
