// ==========================================
// 产品阶梯价导入 - 自然键与等值比较
// ==========================================
// 自然键: parent_key | all_groups | customer_group_id | qty(4 位小数) | website_id
// 说明: 自然键是"同一条阶梯价"的唯一判定依据；
//       等值比较额外包含价格，用于判断已匹配记录是否需要更新
// ==========================================

use crate::domain::TierPriceRecord;

/// 自然键分隔符（不会出现在任何数值分量中）
pub const KEY_SEPARATOR: char = '|';

/// 计算自然键
pub fn natural_key(record: &TierPriceRecord) -> String {
    format!(
        "{}{sep}{}{sep}{}{sep}{:.4}{sep}{}",
        record.parent_key.0,
        record.all_groups as u8,
        record.customer_group_id,
        record.qty,
        record.website_id,
        sep = KEY_SEPARATOR,
    )
}

/// 两条阶梯价是否完全一致（忽略 record_id）
pub fn tier_prices_equal(a: &TierPriceRecord, b: &TierPriceRecord) -> bool {
    a.parent_key == b.parent_key
        && a.value == b.value
        && a.percentage_value == b.percentage_value
        && a.qty == b.qty
        && a.all_groups == b.all_groups
        && a.customer_group_id == b.customer_group_id
        && a.website_id == b.website_id
}
