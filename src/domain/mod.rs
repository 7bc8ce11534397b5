// ==========================================
// 产品阶梯价导入 - 领域层
// ==========================================
// 职责: 实体与基础类型，不含数据访问与业务流程
// ==========================================

pub mod tier_price;
pub mod types;

// 重导出核心类型
pub use tier_price::{
    column_keys, default_codes, ImportRow, ProductRef, TierPriceArtefact, TierPriceRecord,
};
pub use types::{CodeKind, ImportMode, ParentKey, PrimaryKeyMember, RecordId, ValueType};
