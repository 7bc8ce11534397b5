// ==========================================
// 产品阶梯价导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级:
// - 行级错误: 非调试模式中止整次导入，调试模式跳过当前行并告警
// - 告警: 网站未分配，始终只跳过条目
// - 网关错误: 始终向上传播
// ==========================================

use crate::domain::CodeKind;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("产物导出失败: {0}")]
    ArtefactExportError(String),

    // ===== 行级校验错误 =====
    #[error("阶梯价缺少字段 {field} (SKU {sku})")]
    MissingField { sku: String, field: String },

    #[error("无效的价格类型 \"{value_type}\" (SKU {sku})")]
    InvalidValueType { sku: String, value_type: String },

    #[error("无法识别的{kind}代码: \"{code}\"")]
    UnknownCode { kind: CodeKind, code: String },

    #[error("数值格式错误 (SKU {sku}, 字段 {field}): {value}")]
    InvalidNumber {
        sku: String,
        field: String,
        value: String,
    },

    #[error("产品不存在: SKU \"{0}\"")]
    ProductNotFound(String),

    // ===== 告警（不中止）=====
    #[error("产品 {sku} 未分配到网站 \"{website}\"")]
    WebsiteNotAssigned { sku: String, website: String },

    // ===== 持久化网关错误 =====
    #[error("持久化失败: {0}")]
    Repository(#[from] RepositoryError),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 行级错误：调试模式下仅跳过当前行
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            ImportError::MissingField { .. }
                | ImportError::InvalidValueType { .. }
                | ImportError::UnknownCode { .. }
                | ImportError::InvalidNumber { .. }
                | ImportError::ProductNotFound(_)
        )
    }

    /// 告警：任何模式下都不中止
    pub fn is_warning(&self) -> bool {
        matches!(self, ImportError::WebsiteNotAssigned { .. })
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

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::InternalError(format!("JSON 序列化失败: {}", err))
    }
}

// 实现 From<rusqlite::Error>（经由仓储错误分类）
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Repository(RepositoryError::from(err))
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
