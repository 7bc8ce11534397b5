// ==========================================
// 产品阶梯价导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::import_config::TierPriceImportConfig;
use crate::domain::{ImportMode, PrimaryKeyMember};
use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::PathBuf;

// ==========================================
// TierPriceConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait TierPriceConfigReader {
    // ===== 行为开关 =====

    /// 是否清理过期阶梯价
    ///
    /// # 默认值
    /// - true
    fn get_clean_up_tier_prices(&self) -> ImportResult<bool>;

    /// 是否调试模式（行级错误降级为告警）
    ///
    /// # 默认值
    /// - false
    fn is_debug_mode(&self) -> ImportResult<bool>;

    /// 是否校验网站分配
    ///
    /// # 默认值
    /// - true
    fn get_check_website_assignment(&self) -> ImportResult<bool>;

    // ===== 代码映射 =====

    /// 客户组代码别名（JSON 对象）
    fn get_customer_group_code_mappings(&self) -> ImportResult<HashMap<String, String>>;

    /// 网站代码别名（JSON 对象）
    fn get_website_code_mappings(&self) -> ImportResult<HashMap<String, String>>;

    // ===== 结构配置 =====

    /// 产品主键列
    ///
    /// # 默认值
    /// - entity_id
    fn get_primary_key_member(&self) -> ImportResult<PrimaryKeyMember>;

    /// 导入模式
    ///
    /// # 默认值
    /// - direct
    fn get_import_mode(&self) -> ImportResult<ImportMode>;

    /// 条目内字段分隔符
    ///
    /// # 默认值
    /// - ','
    fn get_field_delimiter(&self) -> ImportResult<char>;

    /// 产物导出目录
    fn get_artefact_export_dir(&self) -> ImportResult<PathBuf>;

    /// 组装完整配置快照
    fn load_import_config(&self) -> ImportResult<TierPriceImportConfig> {
        Ok(TierPriceImportConfig {
            clean_up_tier_prices: self.get_clean_up_tier_prices()?,
            debug_mode: self.is_debug_mode()?,
            check_website_assignment: self.get_check_website_assignment()?,
            customer_group_code_mappings: self.get_customer_group_code_mappings()?,
            website_code_mappings: self.get_website_code_mappings()?,
            primary_key_member: self.get_primary_key_member()?,
            import_mode: self.get_import_mode()?,
            field_delimiter: self.get_field_delimiter()?,
            artefact_export_dir: self.get_artefact_export_dir()?,
        })
    }
}
