// ==========================================
// 表格数据导入工具 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层: ConversionError → RowMappingError → ImportError
// ==========================================

use thiserror::Error;

// ==========================================
// ConversionError - 单元格转换错误
// ==========================================
/// 转换器无法解析单元格文本时返回
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{converter} 转换失败 (值: {value:?}): {message}")]
pub struct ConversionError {
    /// 转换器名称
    pub converter: &'static str,
    /// 原始文本
    pub value: String,
    pub message: String,
}

impl ConversionError {
    pub fn new(converter: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            converter,
            value: value.into(),
            message: message.into(),
        }
    }
}

// ==========================================
// RowMappingError - 单行映射错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowMappingError {
    #[error("必填列 '{column}' 不能为空")]
    RequiredField { column: String },

    #[error("字段 {field} (列 '{column}') 转换失败: {source}")]
    Conversion {
        field: &'static str,
        column: String,
        #[source]
        source: ConversionError,
    },
}

impl RowMappingError {
    /// 出错的列名
    pub fn column(&self) -> &str {
        match self {
            RowMappingError::RequiredField { column } => column,
            RowMappingError::Conversion { column, .. } => column,
        }
    }
}

// ==========================================
// ImportError - 导入模块错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 参数错误 =====
    #[error("参数错误: {0}")]
    InvalidArgument(String),

    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xlsb/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("工作表为空")]
    EmptySheet,

    // ===== 数据映射错误 =====
    #[error("第 {row} 行映射失败: {source}")]
    RowMapping {
        row: usize,
        #[source]
        source: RowMappingError,
    },

    // ===== 并发错误 =====
    #[error("分批处理被中断: {0}")]
    BatchInterrupted(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },
}

impl ImportError {
    /// 若为必填列缺失，返回列名
    pub fn missing_required_column(&self) -> Option<&str> {
        match self {
            ImportError::RowMapping {
                source: RowMappingError::RequiredField { column },
                ..
            } => Some(column),
            _ => None,
        }
    }

    /// 出错的表格行号（1 起，表头为第 1 行）
    pub fn row(&self) -> Option<usize> {
        match self {
            ImportError::RowMapping { row, .. } => Some(*row),
            _ => None,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<tokio::task::JoinError>
impl From<tokio::task::JoinError> for ImportError {
    fn from(err: tokio::task::JoinError) -> Self {
        ImportError::BatchInterrupted(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field_message_names_column() {
        let err = ImportError::RowMapping {
            row: 3,
            source: RowMappingError::RequiredField {
                column: "Name".to_string(),
            },
        };

        assert_eq!(err.missing_required_column(), Some("Name"));
        assert_eq!(err.row(), Some(3));
        assert!(err.to_string().contains("Name"));
    }

    #[test]
    fn test_conversion_error_keeps_source() {
        let err = RowMappingError::Conversion {
            field: "age",
            column: "Age".to_string(),
            source: ConversionError::new("IntConverter", "abc", "无法解析为整数"),
        };

        assert_eq!(err.column(), "Age");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: ImportError = io.into();
        assert!(matches!(err, ImportError::FileReadError(msg) if msg.contains("disk gone")));
    }
}
