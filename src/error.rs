//! 错误处理模块
//!
//! 定义导入与查询流程中所有可能出现的错误类型。
//! 每个错误都携带操作名、参数或路径等上下文，调用者无需了解内部实现即可定位问题。

use thiserror::Error;

/// rat_sheetdb 统一错误类型
#[derive(Error, Debug)]
pub enum SheetDbError {
    /// 无法打开或创建数据库文件
    #[error("{message}")]
    StorageUnavailable { path: String, message: String },

    /// 输入文件不存在
    #[error("{}", source_not_found_message(.path))]
    SourceNotFound { path: String },

    /// 输入文件存在但无法解析为表格数据
    #[error("{message}")]
    SourceFormatError { path: String, message: String },

    /// 查询语法错误或引用了不存在的表/列
    #[error("{message}")]
    QueryError { operation: String, message: String },

    /// 调用者传入的参数不在允许范围内
    #[error("{message}")]
    InvalidParameter {
        operation: String,
        parameter: String,
        message: String,
    },

    /// 配置错误
    #[error("{message}")]
    ConfigError { message: String },

    /// 序列化/反序列化错误
    #[error("{message}")]
    SerializationError { message: String },
}

fn source_not_found_message(path: &str) -> String {
    crate::i18n::tf("error.source_not_found", &[("path", path)])
}

/// rat_sheetdb 结果类型
pub type SheetDbResult<T> = Result<T, SheetDbError>;

impl SheetDbError {
    /// 错误种类名称，便于日志与测试断言
    pub fn kind(&self) -> &'static str {
        match self {
            SheetDbError::StorageUnavailable { .. } => "StorageUnavailable",
            SheetDbError::SourceNotFound { .. } => "SourceNotFound",
            SheetDbError::SourceFormatError { .. } => "SourceFormatError",
            SheetDbError::QueryError { .. } => "QueryError",
            SheetDbError::InvalidParameter { .. } => "InvalidParameter",
            SheetDbError::ConfigError { .. } => "ConfigError",
            SheetDbError::SerializationError { .. } => "SerializationError",
        }
    }
}

impl SheetDbError {
    /// 参数不在允许范围内
    pub fn invalid_parameter(operation: &str, parameter: &str, reason: &str) -> Self {
        crate::quick_error!(
            param,
            operation,
            parameter,
            crate::i18n::tf(
                "error.invalid_parameter",
                &[("operation", operation), ("parameter", parameter), ("message", reason)],
            )
        )
    }

    /// 数据库执行失败
    pub fn query_failed(operation: &str, message: &str) -> Self {
        crate::quick_error!(
            query,
            operation,
            crate::i18n::tf("error.query", &[("operation", operation), ("message", message)])
        )
    }

    /// 引用了不存在的表
    pub fn table_not_found(operation: &str, table: &str) -> Self {
        crate::quick_error!(
            query,
            operation,
            crate::i18n::tf("error.table_not_found", &[("operation", operation), ("table", table)])
        )
    }

    /// 引用了不存在的列
    pub fn column_not_found(operation: &str, table: &str, column: &str) -> Self {
        crate::quick_error!(
            query,
            operation,
            crate::i18n::tf(
                "error.column_not_found",
                &[("operation", operation), ("table", table), ("column", column)],
            )
        )
    }

    /// 无法打开数据库
    pub fn storage_unavailable(path: &str, message: &str) -> Self {
        crate::quick_error!(
            storage,
            path,
            crate::i18n::tf("error.storage_open", &[("path", path), ("message", message)])
        )
    }
}

impl From<serde_json::Error> for SheetDbError {
    fn from(e: serde_json::Error) -> Self {
        SheetDbError::SerializationError {
            message: crate::i18n::tf("error.serialization", &[("message", e.to_string().as_str())]),
        }
    }
}

impl From<toml::de::Error> for SheetDbError {
    fn from(e: toml::de::Error) -> Self {
        SheetDbError::ConfigError {
            message: crate::i18n::tf("error.config_parse", &[("message", e.to_string().as_str())]),
        }
    }
}

/// 快速构建错误的宏
///
/// ```ignore
/// quick_error!(query, "select_all", "表不存在");
/// quick_error!(param, "select_limited", "count", "不能为负数");
/// ```
#[macro_export]
macro_rules! quick_error {
    (storage, $path:expr, $msg:expr) => {
        $crate::error::SheetDbError::StorageUnavailable {
            path: $path.to_string(),
            message: $msg.to_string(),
        }
    };
    (not_found, $path:expr) => {
        $crate::error::SheetDbError::SourceNotFound {
            path: $path.to_string(),
        }
    };
    (format, $path:expr, $msg:expr) => {
        $crate::error::SheetDbError::SourceFormatError {
            path: $path.to_string(),
            message: $msg.to_string(),
        }
    };
    (query, $op:expr, $msg:expr) => {
        $crate::error::SheetDbError::QueryError {
            operation: $op.to_string(),
            message: $msg.to_string(),
        }
    };
    (param, $op:expr, $param:expr, $msg:expr) => {
        $crate::error::SheetDbError::InvalidParameter {
            operation: $op.to_string(),
            parameter: $param.to_string(),
            message: $msg.to_string(),
        }
    };
    (config, $msg:expr) => {
        $crate::error::SheetDbError::ConfigError {
            message: $msg.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::SheetDbError::SerializationError {
            message: $msg.to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_error_kinds() {
        let err = crate::quick_error!(param, "select_limited", "count", "negative");
        assert_eq!(err.kind(), "InvalidParameter");
        match err {
            SheetDbError::InvalidParameter { operation, parameter, .. } => {
                assert_eq!(operation, "select_limited");
                assert_eq!(parameter, "count");
            }
            other => panic!("意外的错误类型: {:?}", other),
        }

        let err = crate::quick_error!(not_found, "/no/such/file.xlsx");
        assert_eq!(err.kind(), "SourceNotFound");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: SheetDbError = parse.unwrap_err().into();
        assert_eq!(err.kind(), "SerializationError");
    }
}
