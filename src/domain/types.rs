// ==========================================
// 产品阶梯价导入 - 领域类型定义
// ==========================================
// 职责: 价格类型 / 主键类型 / 导入模式等基础枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 价格类型 (Value Type)
// ==========================================
// Fixed: 绝对价格（写入 value）
// Discount: 折扣百分比（写入 percentage_value）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Fixed,
    Discount,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Fixed => "Fixed",
            ValueType::Discount => "Discount",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// ParentKey - 所属产品主键
// ==========================================
// 取值列由 PrimaryKeyMember 在启动时一次性决定（entity_id / row_id）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParentKey(pub i64);

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// RecordId - 阶梯价代理主键（value_id）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// 产品主键列 (Primary Key Member)
// ==========================================
// 社区版: entity_id；启用 staging 的版本: row_id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrimaryKeyMember {
    #[default]
    EntityId,
    RowId,
}

impl PrimaryKeyMember {
    /// 列名（同时用于产品表与阶梯价表的外键列）
    pub fn column_name(&self) -> &'static str {
        match self {
            PrimaryKeyMember::EntityId => "entity_id",
            PrimaryKeyMember::RowId => "row_id",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "entity_id" => Some(PrimaryKeyMember::EntityId),
            "row_id" => Some(PrimaryKeyMember::RowId),
            _ => None,
        }
    }
}

impl fmt::Display for PrimaryKeyMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

// ==========================================
// 导入模式 (Import Mode)
// ==========================================
// Direct: 逐行直接对账落库
// ArtefactExport: 仅解析并导出产物文件，由后续 Direct 批次落库
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    #[default]
    Direct,
    ArtefactExport,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Direct => "direct",
            ImportMode::ArtefactExport => "artefact-export",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Some(ImportMode::Direct),
            "artefact-export" | "artefact_export" => Some(ImportMode::ArtefactExport),
            _ => None,
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 代码类型 (用于 UnknownCode 错误)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Website,
    CustomerGroup,
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeKind::Website => write!(f, "网站"),
            CodeKind::CustomerGroup => write!(f, "客户组"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_member_from_code() {
        assert_eq!(
            PrimaryKeyMember::from_code("entity_id"),
            Some(PrimaryKeyMember::EntityId)
        );
        assert_eq!(PrimaryKeyMember::from_code(" ROW_ID "), Some(PrimaryKeyMember::RowId));
        assert_eq!(PrimaryKeyMember::from_code("sku"), None);
        assert_eq!(PrimaryKeyMember::RowId.column_name(), "row_id");
    }

    #[test]
    fn test_import_mode_from_code() {
        assert_eq!(ImportMode::from_code("direct"), Some(ImportMode::Direct));
        assert_eq!(
            ImportMode::from_code("Artefact-Export"),
            Some(ImportMode::ArtefactExport)
        );
        assert_eq!(ImportMode::from_code("replace"), None);
        assert_eq!(ImportMode::ArtefactExport.to_string(), "artefact-export");
    }
}
