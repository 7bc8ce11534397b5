// ==========================================
// 产品阶梯价导入 - 代码解析器
// ==========================================
// 职责: 网站/客户组代码 → ID（先应用别名映射）
// 数据: store_website / customer_group 表，批次开始时加载一次
// ==========================================

use crate::config::TierPriceImportConfig;
use crate::domain::{default_codes, CodeKind};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::tier_price_importer_trait::CodeResolver;
use crate::repository::{CustomerGroupRepository, StoreWebsiteRepository};
use std::collections::HashMap;

pub struct StoreCodeResolver {
    websites: HashMap<String, i64>,
    customer_groups: HashMap<String, i64>,
    website_mappings: HashMap<String, String>,
    customer_group_mappings: HashMap<String, String>,
}

impl StoreCodeResolver {
    pub fn new(
        websites: HashMap<String, i64>,
        customer_groups: HashMap<String, i64>,
        website_mappings: HashMap<String, String>,
        customer_group_mappings: HashMap<String, String>,
    ) -> Self {
        Self {
            websites,
            customer_groups,
            website_mappings,
            customer_group_mappings,
        }
    }

    /// 从仓储加载代码表
    pub fn load(
        website_repo: &StoreWebsiteRepository,
        customer_group_repo: &CustomerGroupRepository,
        config: &TierPriceImportConfig,
    ) -> ImportResult<Self> {
        let websites = website_repo.find_all()?;
        let customer_groups = customer_group_repo.find_all()?;

        tracing::debug!(
            websites = websites.len(),
            customer_groups = customer_groups.len(),
            "代码表已加载"
        );

        Ok(Self::new(
            websites,
            customer_groups,
            config.website_code_mappings.clone(),
            config.customer_group_code_mappings.clone(),
        ))
    }

    fn map_alias<'a>(mappings: &'a HashMap<String, String>, code: &'a str) -> &'a str {
        let code = code.trim();
        mappings.get(code).map(|c| c.as_str()).unwrap_or(code)
    }
}

impl CodeResolver for StoreCodeResolver {
    fn resolve_website_id(&self, code: &str) -> ImportResult<i64> {
        let mapped = Self::map_alias(&self.website_mappings, code);
        if mapped == default_codes::ALL_WEBSITES {
            return Ok(default_codes::WEBSITE_ID_ALL_WEBSITES);
        }

        self.websites
            .get(mapped)
            .copied()
            .ok_or_else(|| ImportError::UnknownCode {
                kind: CodeKind::Website,
                code: code.to_string(),
            })
    }

    fn resolve_customer_group_id(&self, code: &str) -> ImportResult<i64> {
        if self.is_all_groups(code) {
            return Ok(default_codes::CUSTOMER_GROUP_ID_ALL_GROUPS);
        }

        let mapped = Self::map_alias(&self.customer_group_mappings, code);
        self.customer_groups
            .get(mapped)
            .copied()
            .ok_or_else(|| ImportError::UnknownCode {
                kind: CodeKind::CustomerGroup,
                code: code.to_string(),
            })
    }

    fn is_all_groups(&self, code: &str) -> bool {
        Self::map_alias(&self.customer_group_mappings, code) == default_codes::ALL_GROUPS
    }
}
