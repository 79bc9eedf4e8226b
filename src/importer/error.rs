// ==========================================
// 作业日志追踪系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 仅包含"整批中止"级别的错误；
//       单元格/行级错误以文本形式收集在 ImportOutcome.errors 中
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 上传/文件相关错误 =====
    #[error("上传的文件为空")]
    EmptyUpload,

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("无法解析工作簿: {0}")]
    UnreadableWorkbook(String),

    // ===== 工作表结构错误 =====
    #[error("工作簿缺少必需的工作表: 需要索引 {required:?}, 实际工作表数量 {actual}")]
    SheetMissing { required: Vec<usize>, actual: usize },

    #[error("工作表读取失败 (索引 {index}): {message}")]
    SheetReadError { index: usize, message: String },

    // ===== 配置错误 =====
    #[error("表格布局配置错误 (key: {key}): {message}")]
    LayoutConfigError { key: String, message: String },

    #[error("未知的表格布局版本: {0}")]
    UnknownLayoutVersion(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否为调用方输入问题（文件缺失/工作表缺失/无法解析）
    ///
    /// HTTP 层据此区分 400 与 500
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImportError::EmptyUpload
                | ImportError::UnreadableWorkbook(_)
                | ImportError::SheetMissing { .. }
                | ImportError::SheetReadError { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::UnreadableWorkbook(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(ImportError::EmptyUpload.is_client_error());
        assert!(ImportError::SheetMissing {
            required: vec![2, 3],
            actual: 1
        }
        .is_client_error());
        assert!(!ImportError::FileReadError("disk".to_string()).is_client_error());
        assert!(!ImportError::InternalError("x".to_string()).is_client_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ImportError = io_err.into();
        assert!(matches!(err, ImportError::FileReadError(_)));
    }
}
