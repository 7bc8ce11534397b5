// ==========================================
// 产品阶梯价导入 - 行解析器
// ==========================================
// 职责: 从单行导入数据中提取 0..N 条阶梯价产物
// 格式: tier_prices = "qty=10,price=9.99,website=base|qty=20,price=8.99"
//       条目之间用 '|' 分隔，条目内 key=value 用字段分隔符（默认 ','）分隔
// 缺省: value_type → Fixed, website → All Websites, customer_group → ALL GROUPS
// ==========================================

use crate::domain::{column_keys, default_codes, ImportRow, TierPriceArtefact};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// 条目分隔符
pub const ENTRY_DELIMITER: char = '|';

/// 默认字段分隔符
pub const DEFAULT_FIELD_DELIMITER: char = ',';

// 条目内的键
const KEY_QTY: &str = "qty";
const KEY_PRICE: &str = "price";
const KEY_VALUE_TYPE: &str = "value_type";
const KEY_WEBSITE: &str = "website";
const KEY_CUSTOMER_GROUP: &str = "customer_group";

#[derive(Debug, Clone)]
pub struct TierPriceRowParser {
    field_delimiter: char,
    cleaner: DataCleaner,
}

impl Default for TierPriceRowParser {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD_DELIMITER)
    }
}

impl TierPriceRowParser {
    pub fn new(field_delimiter: char) -> Self {
        Self {
            field_delimiter,
            cleaner: DataCleaner,
        }
    }

    /// 阶梯价只在 admin 视图行上映射（store_view_code 为空视为 admin）
    pub fn is_admin_row(&self, row: &ImportRow) -> bool {
        match self.cleaner.normalize_null(row.get(column_keys::STORE_VIEW_CODE)) {
            None => true,
            Some(code) => code.eq_ignore_ascii_case(default_codes::ADMIN_STORE_VIEW),
        }
    }

    /// 解析一行
    ///
    /// # 返回
    /// - 产品导入行（含 tier_prices 列）：每个条目一个产物
    /// - 产物行（含 tier_price_qty / tier_price 列）：一个产物
    /// - 非 admin 视图行或无阶梯价列：空列表
    pub fn parse_row(&self, row: &ImportRow) -> ImportResult<Vec<TierPriceArtefact>> {
        if !self.is_admin_row(row) {
            debug!(row_number = row.row_number, sku = %row.sku(), "非 admin 视图行，跳过阶梯价映射");
            return Ok(Vec::new());
        }

        if let Some(cell) = row.get(column_keys::TIER_PRICES) {
            return self.parse_cell(row.sku(), row.row_number, cell);
        }

        if row.get(column_keys::TIER_PRICE_QTY).is_some() || row.get(column_keys::TIER_PRICE).is_some()
        {
            return Ok(vec![self.parse_flat_row(row)?]);
        }

        Ok(Vec::new())
    }

    /// 解析序列化的 tier_prices 单元格
    pub fn parse_cell(
        &self,
        sku: &str,
        row_number: usize,
        cell: &str,
    ) -> ImportResult<Vec<TierPriceArtefact>> {
        let mut artefacts = Vec::new();

        for entry in cell.split(ENTRY_DELIMITER) {
            if entry.trim().is_empty() {
                continue;
            }

            let assignments = self.parse_assignments(sku, entry);
            let artefact = self.build_artefact(
                sku,
                row_number,
                assignments.get(KEY_QTY).map(|v| v.as_str()),
                assignments.get(KEY_PRICE).map(|v| v.as_str()),
                assignments.get(KEY_VALUE_TYPE).map(|v| v.as_str()),
                assignments.get(KEY_WEBSITE).map(|v| v.as_str()),
                assignments.get(KEY_CUSTOMER_GROUP).map(|v| v.as_str()),
                column_keys::TIER_PRICES,
            )?;
            artefacts.push(artefact);
        }

        Ok(artefacts)
    }

    /// 解析已展开的产物行（产物导出文件格式）
    pub fn parse_flat_row(&self, row: &ImportRow) -> ImportResult<TierPriceArtefact> {
        self.build_artefact(
            row.sku(),
            row.row_number,
            row.get(column_keys::TIER_PRICE_QTY),
            row.get(column_keys::TIER_PRICE),
            row.get(column_keys::TIER_PRICE_VALUE_TYPE),
            row.get(column_keys::TIER_PRICE_WEBSITE),
            row.get(column_keys::TIER_PRICE_CUSTOMER_GROUP),
            "",
        )
    }

    /// 拆分条目内的 key=value（无 '=' 视为空值）
    fn parse_assignments(&self, sku: &str, entry: &str) -> HashMap<String, String> {
        let mut assignments = HashMap::new();

        for assignment in entry.split(self.field_delimiter) {
            if assignment.trim().is_empty() {
                continue;
            }
            let (key, value) = assignment.split_once('=').unwrap_or((assignment, ""));
            let key = self.cleaner.clean_text(key, false).to_lowercase();

            match key.as_str() {
                KEY_QTY | KEY_PRICE | KEY_VALUE_TYPE | KEY_WEBSITE | KEY_CUSTOMER_GROUP => {
                    assignments.insert(key, self.cleaner.clean_text(value, false));
                }
                _ => debug!(sku = %sku, key = %key, "忽略未知的阶梯价字段"),
            }
        }

        assignments
    }

    #[allow(clippy::too_many_arguments)]
    fn build_artefact(
        &self,
        sku: &str,
        row_number: usize,
        qty: Option<&str>,
        price: Option<&str>,
        value_type: Option<&str>,
        website: Option<&str>,
        customer_group: Option<&str>,
        source_column: &str,
    ) -> ImportResult<TierPriceArtefact> {
        let sku = self
            .cleaner
            .normalize_null(Some(sku))
            .ok_or_else(|| ImportError::MissingField {
                sku: String::new(),
                field: column_keys::SKU.to_string(),
            })?;

        let qty = self
            .cleaner
            .normalize_null(qty)
            .ok_or_else(|| ImportError::MissingField {
                sku: sku.clone(),
                field: KEY_QTY.to_string(),
            })?;
        let price = self
            .cleaner
            .normalize_null(price)
            .ok_or_else(|| ImportError::MissingField {
                sku: sku.clone(),
                field: KEY_PRICE.to_string(),
            })?;

        let mut original_columns = BTreeMap::new();
        original_columns.insert(column_keys::SKU.to_string(), column_keys::SKU.to_string());
        for column in column_keys::ARTEFACT_HEADERS[1..].iter().copied() {
            let source = if source_column.is_empty() {
                column
            } else {
                source_column
            };
            original_columns.insert(column.to_string(), source.to_string());
        }

        Ok(TierPriceArtefact {
            sku,
            qty,
            price,
            value_type: self
                .cleaner
                .value_or_default(value_type, default_codes::VALUE_TYPE_FIXED),
            website: self
                .cleaner
                .value_or_default(website, default_codes::ALL_WEBSITES),
            customer_group: self
                .cleaner
                .value_or_default(customer_group, default_codes::ALL_GROUPS),
            row_number,
            original_columns,
        })
    }
}
