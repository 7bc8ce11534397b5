// ==========================================
// 产品阶梯价导入 - 数据清洗器
// ==========================================
// 职责: TRIM / NULL 标准化 / 缺省值填充
// ==========================================

#[derive(Debug, Clone, Copy, Default)]
pub struct DataCleaner;

impl DataCleaner {
    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    /// 标准化 NULL 值（空字符串/空白 → None）
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 空值时使用缺省值
    pub fn value_or_default(&self, value: Option<&str>, default: &str) -> String {
        self.normalize_null(value)
            .unwrap_or_else(|| default.to_string())
    }
}
