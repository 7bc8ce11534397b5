// ==========================================
// 产品阶梯价导入 - 价格类型注册表
// ==========================================
// 职责: 校验与分类价格类型（fixed / discount），大小写不敏感
// 说明: 只做分类，非法类型由调用方拒绝
// ==========================================

use crate::domain::ValueType;

pub const FIXED: &str = "fixed";
pub const DISCOUNT: &str = "discount";

#[derive(Debug, Clone)]
pub struct ValueTypes {
    types: Vec<&'static str>,
}

impl Default for ValueTypes {
    fn default() -> Self {
        Self {
            types: vec![FIXED, DISCOUNT],
        }
    }
}

impl ValueTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_value_type(&self, value_type: &str) -> bool {
        let lowered = value_type.to_lowercase();
        self.types.iter().any(|t| *t == lowered)
    }

    pub fn is_fixed(&self, value_type: &str) -> bool {
        value_type.to_lowercase() == FIXED
    }

    pub fn is_discount(&self, value_type: &str) -> bool {
        value_type.to_lowercase() == DISCOUNT
    }

    /// 分类（非法类型返回 None）
    pub fn classify(&self, value_type: &str) -> Option<ValueType> {
        if self.is_fixed(value_type) {
            Some(ValueType::Fixed)
        } else if self.is_discount(value_type) {
            Some(ValueType::Discount)
        } else {
            None
        }
    }
}
