use crate::api::error::ApiError;
use crate::app::state::AppState;
use crate::domain::types::SortDirection;
use crate::domain::work_log::{
    CreateWorkLogRequest, StatusUpdateRequest, UpdateWorkLogRequest, WorkLogFilter, WorkLogPage,
    WorkLogQuery, WorkLogView,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::common::{
    non_blank, parse_range_end, parse_range_start, parse_status, require_date, SortParams,
};

// ==========================================
// 作业日志相关接口
// ==========================================

/// 列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    pub car_model: Option<String>,
    #[serde(alias = "materialCode")]
    pub product_code: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
}

impl ListParams {
    fn into_query(self) -> Result<WorkLogQuery, ApiError> {
        let status = parse_status(self.status)?;
        let start = non_blank(self.start_date)
            .map(|raw| parse_range_start(&raw))
            .transpose()?;
        let end = non_blank(self.end_date)
            .map(|raw| parse_range_end(&raw))
            .transpose()?;

        Ok(WorkLogQuery {
            filter: WorkLogFilter {
                car_model: non_blank(self.car_model),
                product_code: non_blank(self.product_code),
                status,
                start,
                end,
            },
            // 列表默认按作业时间倒序
            sort: SortParams::new(self.sort_field, self.sort_direction).to_sort(SortDirection::Desc),
            page: self.page.unwrap_or(1),
            size: self.size.unwrap_or(0),
        })
    }
}

/// 按日期查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateParams {
    pub status: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
}

/// 时间区间参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RangeParams {
    pub start_date: String,
    pub end_date: String,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
}

/// GET /api/worklogs
pub async fn list_work_logs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<WorkLogPage>, ApiError> {
    let query = params.into_query()?;
    Ok(Json(state.work_log_api.list_work_logs(query)?))
}

/// POST /api/worklogs
pub async fn create_work_log(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkLogRequest>,
) -> Result<Json<Value>, ApiError> {
    let created = state.work_log_api.create_work_log(request)?;
    Ok(Json(json!({ "id": created.id })))
}

/// GET /api/worklogs/:id
pub async fn get_work_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WorkLogView>, ApiError> {
    Ok(Json(state.work_log_api.get_work_log(id)?))
}

/// PUT /api/worklogs/:id
pub async fn update_work_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateWorkLogRequest>,
) -> Result<StatusCode, ApiError> {
    state.work_log_api.update_work_log(id, request)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/worklogs/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<WorkLogView>, ApiError> {
    let completed_by = non_blank(request.completed_by);
    let updated = state
        .work_log_api
        .update_completion_status(id, request.completed, completed_by.as_deref())?;
    Ok(Json(WorkLogView::from(updated)))
}

/// DELETE /api/worklogs/:id
pub async fn delete_work_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.work_log_api.delete_work_log(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/worklogs
pub async fn delete_all(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let count = state.work_log_api.delete_all()?;
    Ok(Json(json!({ "deleted": count })))
}

/// GET /api/worklogs/by-date/:date
pub async fn list_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(params): Query<DateParams>,
) -> Result<Json<Vec<WorkLogView>>, ApiError> {
    let date = require_date(&date)?;
    let status = parse_status(params.status)?;
    let sort = SortParams::new(params.sort_field, params.sort_direction).to_sort(SortDirection::Asc);
    Ok(Json(state.work_log_api.list_by_exact_date(date, status, sort)?))
}

/// GET /api/worklogs/by-date-range
pub async fn list_by_date_range(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<WorkLogView>>, ApiError> {
    let start = parse_range_start(&params.start_date)?;
    let end = parse_range_end(&params.end_date)?;
    let sort = SortParams::new(params.sort_field, params.sort_direction).to_sort(SortDirection::Asc);
    Ok(Json(state.work_log_api.list_by_date_range(start, end, sort)?))
}

/// GET /api/worklogs/by-car-model/:car_model
pub async fn list_by_car_model(
    State(state): State<AppState>,
    Path(car_model): Path<String>,
    Query(sort): Query<SortParams>,
) -> Result<Json<Vec<WorkLogView>>, ApiError> {
    let sort = sort.to_sort(SortDirection::Asc);
    Ok(Json(state.work_log_api.list_by_car_model(&car_model, sort)?))
}

/// GET /api/worklogs/by-product-code/:product_code
pub async fn list_by_product_code(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
    Query(sort): Query<SortParams>,
) -> Result<Json<Vec<WorkLogView>>, ApiError> {
    let sort = sort.to_sort(SortDirection::Asc);
    Ok(Json(state.work_log_api.list_by_product_code(&product_code, sort)?))
}

/// GET /api/worklogs/by-status/:status
pub async fn list_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
    Query(sort): Query<SortParams>,
) -> Result<Json<Vec<WorkLogView>>, ApiError> {
    let sort = sort.to_sort(SortDirection::Asc);
    Ok(Json(state.work_log_api.list_by_status(&status, sort)?))
}
