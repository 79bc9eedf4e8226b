// ==========================================
// 作业日志追踪系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户友好的错误消息
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    /// 上传内容问题: 文件缺失/为空、无法解析、工作表缺失
    #[error("{0}")]
    UploadRejected(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 错误码（用于 HTTP 响应体）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::UploadRejected(_) => "UPLOAD_REJECTED",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::InternalError(_) | ApiError::Other(_) => "INTERNAL_ERROR",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseBusy(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("约束违反: {}", msg))
            }
            err @ RepositoryError::DataFormatError { .. } => ApiError::DatabaseError(err.to_string()),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if err.is_client_error() {
            return ApiError::UploadRejected(err.to_string());
        }
        match err {
            ImportError::LayoutConfigError { .. } | ImportError::UnknownLayoutVersion(_) => {
                ApiError::ConfigError(err.to_string())
            }
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_mapping() {
        let err: ApiError = ImportError::EmptyUpload.into();
        assert!(matches!(err, ApiError::UploadRejected(_)));

        let err: ApiError = ImportError::SheetMissing {
            required: vec![2, 3],
            actual: 2,
        }
        .into();
        assert_eq!(err.code(), "UPLOAD_REJECTED");

        let err: ApiError = ImportError::FileReadError("broken pipe".into()).into();
        assert!(matches!(err, ApiError::ImportError(_)));

        let err: ApiError = ImportError::UnknownLayoutVersion("v9".into()).into();
        assert!(matches!(err, ApiError::ConfigError(_)));
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::LockError("poisoned".into()).into();
        assert!(matches!(err, ApiError::DatabaseConnectionError(_)));
        assert_eq!(err.code(), "DATABASE_CONNECTION_ERROR");
    }
}
