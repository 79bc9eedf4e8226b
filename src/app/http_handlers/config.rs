use crate::api::config_api::ConfigItem;
use crate::api::error::ApiError;
use crate::app::state::AppState;
use crate::importer::layout::SheetLayout;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

// ==========================================
// 配置管理相关接口
// ==========================================

/// 布局预设切换请求
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutVersionRequest {
    pub version: String,
}

/// GET /api/config
pub async fn list_configs(State(state): State<AppState>) -> Result<Json<Vec<ConfigItem>>, ApiError> {
    Ok(Json(state.config_api.list_configs()?))
}

/// GET /api/config/import-layout
pub async fn get_import_layout(State(state): State<AppState>) -> Result<Json<SheetLayout>, ApiError> {
    Ok(Json(state.config_api.get_import_layout()?))
}

/// PUT /api/config/import-layout
pub async fn save_import_layout(
    State(state): State<AppState>,
    Json(layout): Json<SheetLayout>,
) -> Result<Json<SheetLayout>, ApiError> {
    Ok(Json(state.config_api.save_custom_import_layout(layout)?))
}

/// PUT /api/config/import-layout/version
pub async fn set_import_layout_version(
    State(state): State<AppState>,
    Json(request): Json<LayoutVersionRequest>,
) -> Result<Json<SheetLayout>, ApiError> {
    Ok(Json(state.config_api.set_import_layout_version(&request.version)?))
}
