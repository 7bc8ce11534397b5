// ==========================================
// 产品阶梯价导入 - 导入配置
// ==========================================
// 职责: 单次导入所需的只读配置快照
// 来源: ConfigManager::load_import_config（config_kv）+ 命令行覆写
// ==========================================

use crate::domain::{ImportMode, PrimaryKeyMember};
use crate::importer::row_parser::DEFAULT_FIELD_DELIMITER;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPriceImportConfig {
    /// 批次结束后删除被触达产品中未再出现的阶梯价
    pub clean_up_tier_prices: bool,

    /// 调试模式：行级错误只告警并跳过当前行
    pub debug_mode: bool,

    /// 校验阶梯价网站是否已分配给产品
    pub check_website_assignment: bool,

    /// 客户组代码别名（别名 → 实际代码）
    pub customer_group_code_mappings: HashMap<String, String>,

    /// 网站代码别名（别名 → 实际代码）
    pub website_code_mappings: HashMap<String, String>,

    pub primary_key_member: PrimaryKeyMember,
    pub import_mode: ImportMode,

    /// 条目内 key=value 分隔符
    pub field_delimiter: char,

    /// 产物导出目录（仅 artefact-export 模式）
    pub artefact_export_dir: PathBuf,
}

impl Default for TierPriceImportConfig {
    fn default() -> Self {
        Self {
            clean_up_tier_prices: true,
            debug_mode: false,
            check_website_assignment: true,
            customer_group_code_mappings: HashMap::new(),
            website_code_mappings: HashMap::new(),
            primary_key_member: PrimaryKeyMember::EntityId,
            import_mode: ImportMode::Direct,
            field_delimiter: DEFAULT_FIELD_DELIMITER,
            artefact_export_dir: PathBuf::from("."),
        }
    }
}
