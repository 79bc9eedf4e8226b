// ==========================================
// 作业日志追踪系统 - 路由配置
// ==========================================

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::app::http_handlers;
use crate::app::state::AppState;

/// 跨域配置
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// 配置所有路由
///
/// # 参数
/// - state: 应用状态
/// - max_upload_bytes: 表格上传大小上限
pub fn configure_routes(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // 表格导入
        // ========================================
        .route(
            "/excel/upload",
            post(http_handlers::upload_workbook).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        // ========================================
        // 作业日志
        // ========================================
        .route(
            "/api/worklogs",
            get(http_handlers::list_work_logs)
                .post(http_handlers::create_work_log)
                .delete(http_handlers::delete_all),
        )
        .route("/api/worklogs/by-date/:date", get(http_handlers::list_by_date))
        .route("/api/worklogs/by-date-range", get(http_handlers::list_by_date_range))
        .route(
            "/api/worklogs/by-car-model/:car_model",
            get(http_handlers::list_by_car_model),
        )
        .route(
            "/api/worklogs/by-product-code/:product_code",
            get(http_handlers::list_by_product_code),
        )
        .route("/api/worklogs/by-status/:status", get(http_handlers::list_by_status))
        .route(
            "/api/worklogs/:id",
            get(http_handlers::get_work_log)
                .put(http_handlers::update_work_log)
                .delete(http_handlers::delete_work_log),
        )
        .route("/api/worklogs/:id/status", patch(http_handlers::update_status))
        // ========================================
        // 实时推送
        // ========================================
        .route("/api/sse/subscribe", get(http_handlers::sse_subscribe))
        .route("/api/sse/status", get(http_handlers::sse_status))
        // ========================================
        // 配置
        // ========================================
        .route("/api/config", get(http_handlers::list_configs))
        .route(
            "/api/config/import-layout",
            get(http_handlers::get_import_layout).put(http_handlers::save_import_layout),
        )
        .route(
            "/api/config/import-layout/version",
            put(http_handlers::set_import_layout_version),
        )
        .layer(cors_layer())
        .with_state(state)
}
