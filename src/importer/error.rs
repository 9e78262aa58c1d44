// ==========================================
// 商品目录导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("YAML 解析失败 ({file}): {message}")]
    YamlParseError { file: String, message: String },

    #[error("记录格式错误 ({key}): {message}")]
    InvalidRecord { key: String, message: String },

    // ===== 数据映射错误 =====
    #[error("字段值无效 ({entity} {identifier}, 字段 {field}): {message}")]
    FieldValueError {
        entity: &'static str,
        identifier: String,
        field: String,
        message: String,
    },

    #[error("十进制数解析失败: {value}")]
    DecimalParseError { value: String },

    // ===== 业务规则错误 =====
    #[error("实体校验失败 ({entity} {identifier}): {message}")]
    ValidationError {
        entity: &'static str,
        identifier: String,
        message: String,
    },

    #[error("引用的{kind}不存在: {identifier}")]
    MissingReference { kind: String, identifier: String },

    #[error("缺少导入依赖: {0}")]
    MissingDependency(String),

    // ===== 数据库错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>（经仓储错误映射）
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Repository(RepositoryError::from(err))
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rusqlite_error_goes_through_repository_mapping() {
        let err: ImportError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, ImportError::Repository(_)));
    }

    #[test]
    fn test_display_carries_identifier() {
        let err = ImportError::MissingReference {
            kind: "shipping method".to_string(),
            identifier: "dhl".to_string(),
        };
        assert!(err.to_string().contains("dhl"));
    }
}
