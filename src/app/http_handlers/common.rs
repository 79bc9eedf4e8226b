use crate::api::error::ApiError;
use crate::domain::datetime_fmt::{day_range, parse_date, parse_flexible};
use crate::domain::types::{SortDirection, SortField, WorkStatus};
use crate::domain::work_log::WorkLogSort;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// 公共工具：错误映射、参数解析
// ==========================================

/// 错误响应（返回给前端）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,
}

pub(super) fn status_of(err: &ApiError) -> StatusCode {
    match err {
        ApiError::InvalidInput(_) | ApiError::UploadRejected(_) => StatusCode::BAD_REQUEST,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::DatabaseConnectionError(_) => StatusCode::SERVICE_UNAVAILABLE,
        ApiError::DatabaseError(_)
        | ApiError::ImportError(_)
        | ApiError::ConfigError(_)
        | ApiError::InternalError(_)
        | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        if status.is_server_error() {
            tracing::error!(code = self.code(), "请求处理失败: {}", self);
        } else {
            tracing::debug!(code = self.code(), "请求被拒绝: {}", self);
        }

        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// 排序参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortParams {
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
}

impl SortParams {
    pub(super) fn new(sort_field: Option<String>, sort_direction: Option<String>) -> Self {
        Self {
            sort_field,
            sort_direction,
        }
    }

    pub(super) fn to_sort(&self, default_direction: SortDirection) -> WorkLogSort {
        WorkLogSort {
            field: self
                .sort_field
                .as_deref()
                .map(SortField::from_param)
                .unwrap_or_default(),
            direction: SortDirection::from_param(self.sort_direction.as_deref(), default_direction),
        }
    }
}

/// 解析日期 (yyyy-MM-dd)
pub(super) fn require_date(raw: &str) -> Result<NaiveDate, ApiError> {
    parse_date(raw)
        .ok_or_else(|| ApiError::InvalidInput(format!("日期格式错误（应为YYYY-MM-DD）: {}", raw)))
}

/// 解析区间起点; 只给日期时取当日 00:00:00
pub(super) fn parse_range_start(raw: &str) -> Result<NaiveDateTime, ApiError> {
    parse_flexible(raw)
        .or_else(|| parse_date(raw).map(|d| day_range(d).0))
        .ok_or_else(|| ApiError::InvalidInput(format!("无效的开始时间: {}", raw)))
}

/// 解析区间终点; 只给日期时取当日 23:59:59
pub(super) fn parse_range_end(raw: &str) -> Result<NaiveDateTime, ApiError> {
    parse_flexible(raw)
        .or_else(|| parse_date(raw).map(|d| day_range(d).1))
        .ok_or_else(|| ApiError::InvalidInput(format!("无效的结束时间: {}", raw)))
}

/// 解析可选的作业状态参数; 空值视为不过滤
pub(super) fn parse_status(raw: Option<String>) -> Result<Option<WorkStatus>, ApiError> {
    non_blank(raw)
        .map(|raw| {
            WorkStatus::from_str(&raw)
                .ok_or_else(|| ApiError::InvalidInput(format!("未知的作业状态: {}", raw)))
        })
        .transpose()
}

/// 非空字符串参数
pub(super) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
