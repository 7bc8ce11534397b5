// ==========================================
// 产品阶梯价导入 - 阶梯价领域模型
// ==========================================
// 职责: 阶梯价记录 / 导入产物 / 产品引用 / 导入行
// 对齐: catalog_product_entity_tier_price 表
// ==========================================

use crate::domain::types::{ParentKey, RecordId, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ==========================================
// 列名常量
// ==========================================
pub mod column_keys {
    pub const SKU: &str = "sku";
    pub const STORE_VIEW_CODE: &str = "store_view_code";
    pub const OPERATION: &str = "operation";

    // 产品导入文件中的序列化列
    pub const TIER_PRICES: &str = "tier_prices";

    // 产物（展开后）列
    pub const TIER_PRICE: &str = "tier_price";
    pub const TIER_PRICE_QTY: &str = "tier_price_qty";
    pub const TIER_PRICE_VALUE_TYPE: &str = "tier_price_value_type";
    pub const TIER_PRICE_WEBSITE: &str = "tier_price_website";
    pub const TIER_PRICE_CUSTOMER_GROUP: &str = "tier_price_customer_group";

    /// 产物文件表头（顺序即导出顺序）
    pub const ARTEFACT_HEADERS: [&str; 6] = [
        SKU,
        TIER_PRICE_QTY,
        TIER_PRICE,
        TIER_PRICE_VALUE_TYPE,
        TIER_PRICE_WEBSITE,
        TIER_PRICE_CUSTOMER_GROUP,
    ];
}

// ==========================================
// 默认代码
// ==========================================
pub mod default_codes {
    pub const ALL_GROUPS: &str = "ALL GROUPS";
    pub const ALL_WEBSITES: &str = "All Websites";
    pub const VALUE_TYPE_FIXED: &str = "Fixed";

    pub const WEBSITE_ID_ALL_WEBSITES: i64 = 0;
    pub const CUSTOMER_GROUP_ID_ALL_GROUPS: i64 = 0;

    pub const ADMIN_STORE_VIEW: &str = "admin";
    pub const OPERATION_DELETE: &str = "delete";
}

// ==========================================
// TierPriceRecord - 阶梯价记录
// ==========================================
// 自然键: (parent_key, all_groups, customer_group_id, qty, website_id)
// 红线: value 与 percentage_value 有且仅有一个有值，与 value_type 一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPriceRecord {
    pub parent_key: ParentKey,
    pub qty: f64,
    pub value_type: ValueType,
    pub value: Option<f64>,            // 仅 Fixed
    pub percentage_value: Option<f64>, // 仅 Discount
    pub website_id: i64,               // 0 = 所有网站
    pub customer_group_id: i64,
    pub all_groups: bool,
    pub record_id: Option<RecordId>, // 落库前为 None
}

impl TierPriceRecord {
    /// 按价格类型构造记录，保证 value / percentage_value 互斥
    pub fn new(
        parent_key: ParentKey,
        qty: f64,
        value_type: ValueType,
        price: f64,
        website_id: i64,
        customer_group_id: i64,
        all_groups: bool,
    ) -> Self {
        let (value, percentage_value) = match value_type {
            ValueType::Fixed => (Some(price), None),
            ValueType::Discount => (None, Some(price)),
        };

        Self {
            parent_key,
            qty,
            value_type,
            value,
            percentage_value,
            website_id,
            customer_group_id,
            all_groups,
            record_id: None,
        }
    }

    pub fn with_record_id(mut self, record_id: RecordId) -> Self {
        self.record_id = Some(record_id);
        self
    }

    /// 当前价格（Fixed 取 value，Discount 取 percentage_value）
    pub fn price(&self) -> f64 {
        match self.value_type {
            ValueType::Fixed => self.value.unwrap_or_default(),
            ValueType::Discount => self.percentage_value.unwrap_or_default(),
        }
    }
}

// ==========================================
// TierPriceArtefact - 导入产物
// ==========================================
// 由行解析器产生的规范化字符串元组（尚未解析代码与数值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPriceArtefact {
    pub sku: String,
    pub qty: String,
    pub price: String,
    pub value_type: String,
    pub website: String,
    pub customer_group: String,

    // ===== 追溯信息 =====
    pub row_number: usize,
    pub original_columns: BTreeMap<String, String>, // 产物列 → 源列
}

impl TierPriceArtefact {
    /// 按产物表头顺序输出字段值
    pub fn to_record(&self) -> [&str; 6] {
        [
            self.sku.as_str(),
            self.qty.as_str(),
            self.price.as_str(),
            self.value_type.as_str(),
            self.website.as_str(),
            self.customer_group.as_str(),
        ]
    }
}

// ==========================================
// ProductRef - 产品引用（由 SKU 解析）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
    pub sku: String,
    pub parent_key: ParentKey,
    pub website_ids: Vec<i64>, // 产品已分配的网站
}

impl ProductRef {
    pub fn is_assigned_to_website(&self, website_id: i64) -> bool {
        self.website_ids.contains(&website_id)
    }
}

// ==========================================
// ImportRow - 单行原始导入数据
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub row_number: usize,
    pub values: HashMap<String, String>,
}

impl ImportRow {
    pub fn new(row_number: usize, values: HashMap<String, String>) -> Self {
        Self { row_number, values }
    }

    /// 读取列值（不存在返回 None）
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(|v| v.as_str())
    }

    /// 列存在且非空白
    pub fn has_value(&self, column: &str) -> bool {
        self.get(column).map(|v| !v.trim().is_empty()).unwrap_or(false)
    }

    pub fn sku(&self) -> &str {
        self.get(column_keys::SKU).map(str::trim).unwrap_or("")
    }
}
