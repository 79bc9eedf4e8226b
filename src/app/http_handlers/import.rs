use crate::api::error::ApiError;
use crate::app::state::AppState;
use crate::domain::import::ImportOutcome;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::common::{non_blank, status_of};

// ==========================================
// 表格导入相关接口
// ==========================================

const FILE_FIELD: &str = "file";
const CAR_MODEL_FIELD: &str = "carModel";

/// 上传表单内容
#[derive(Debug, Default)]
struct UploadForm {
    file_name: String,
    bytes: Option<Vec<u8>>,
    car_model: Option<String>,
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, String> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("上传内容读取失败: {}", e))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                form.file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("文件读取失败: {}", e))?;
                form.bytes = Some(bytes.to_vec());
            }
            Some(CAR_MODEL_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| format!("车型读取失败: {}", e))?;
                form.car_model = non_blank(Some(text));
            }
            _ => {}
        }
    }

    Ok(form)
}

fn failure(status: StatusCode, message: String) -> Response {
    (status, Json(ImportOutcome::failed(message))).into_response()
}

/// POST /excel/upload
///
/// 表单字段: file (xlsx), carModel
///
/// # 响应
/// - 200: 导入完成 (可能含逐条错误)
/// - 400: 未上传文件/未指定车型/文件无法解析/工作表缺失
/// - 500: 上传内容读取失败/内部错误
pub async fn upload_workbook(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(message) => {
            tracing::error!("{}", message);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, message);
        }
    };

    let bytes = match form.bytes {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return failure(StatusCode::BAD_REQUEST, "未上传文件".to_string()),
    };
    let Some(car_model) = form.car_model else {
        return failure(StatusCode::BAD_REQUEST, "未指定车型".to_string());
    };

    tracing::info!(
        file_name = %form.file_name,
        size = bytes.len(),
        car_model = %car_model,
        "收到表格上传"
    );

    match state.import_api.upload(form.file_name, bytes, car_model).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => {
            let status = status_of(&err);
            if status.is_server_error() {
                tracing::error!(code = err.code(), "表格导入失败: {}", err);
            } else {
                tracing::warn!(code = err.code(), "表格导入被拒绝: {}", err);
            }
            let message = match err {
                ApiError::UploadRejected(message) => message,
                other => other.to_string(),
            };
            failure(status, message)
        }
    }
}
