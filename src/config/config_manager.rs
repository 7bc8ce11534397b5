// ==========================================
// 产品阶梯价导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope，仅使用 global scope)
// ==========================================

use crate::config::import_config_trait::TierPriceConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::{ImportMode, PrimaryKeyMember};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row_parser::DEFAULT_FIELD_DELIMITER;
use crate::repository::RepositoryError;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> ImportResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ImportError::Repository(RepositoryError::LockError(e.to_string())))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self.get_conn()?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ImportResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取布尔配置，格式错误时回退默认值
    fn get_bool(&self, key: &str, default: bool) -> ImportResult<bool> {
        let value = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %value,
                    default,
                    "布尔配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 读取代码映射（JSON 对象），格式错误时回退为空映射
    fn get_code_mappings(&self, key: &str) -> ImportResult<HashMap<String, String>> {
        let value = self.get_config_or_default(key, "{}")?;
        let mappings: HashMap<String, String> = serde_json::from_str(&value).unwrap_or_else(|_| {
            tracing::warn!(
                config_key = key,
                raw_value = %value,
                "代码映射配置格式错误，使用空配置"
            );
            HashMap::new()
        });
        Ok(mappings)
    }
}

// ==========================================
// TierPriceConfigReader Trait 实现
// ==========================================
impl TierPriceConfigReader for ConfigManager {
    fn get_clean_up_tier_prices(&self) -> ImportResult<bool> {
        self.get_bool(config_keys::CLEAN_UP_TIER_PRICES, true)
    }

    fn is_debug_mode(&self) -> ImportResult<bool> {
        self.get_bool(config_keys::DEBUG_MODE, false)
    }

    fn get_check_website_assignment(&self) -> ImportResult<bool> {
        self.get_bool(config_keys::CHECK_WEBSITE_ASSIGNMENT, true)
    }

    fn get_customer_group_code_mappings(&self) -> ImportResult<HashMap<String, String>> {
        self.get_code_mappings(config_keys::CUSTOMER_GROUP_CODE_MAPPINGS)
    }

    fn get_website_code_mappings(&self) -> ImportResult<HashMap<String, String>> {
        self.get_code_mappings(config_keys::WEBSITE_CODE_MAPPINGS)
    }

    fn get_primary_key_member(&self) -> ImportResult<PrimaryKeyMember> {
        let value = self.get_config_or_default(config_keys::PRIMARY_KEY_MEMBER, "entity_id")?;
        // 主键列决定 SQL 形态，错误值直接拒绝
        PrimaryKeyMember::from_code(&value).ok_or_else(|| ImportError::ConfigValueError {
            key: config_keys::PRIMARY_KEY_MEMBER.to_string(),
            value,
            message: "仅支持 entity_id / row_id".to_string(),
        })
    }

    fn get_import_mode(&self) -> ImportResult<ImportMode> {
        let value = self.get_config_or_default(config_keys::IMPORT_MODE, "direct")?;
        ImportMode::from_code(&value).ok_or_else(|| ImportError::ConfigValueError {
            key: config_keys::IMPORT_MODE.to_string(),
            value,
            message: "仅支持 direct / artefact-export".to_string(),
        })
    }

    fn get_field_delimiter(&self) -> ImportResult<char> {
        let value = self.get_config_value(config_keys::MULTIPLE_FIELD_DELIMITER)?;
        let delimiter = match value {
            None => DEFAULT_FIELD_DELIMITER,
            Some(v) => {
                let mut chars = v.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c != '|' && c != '=' => c,
                    _ => {
                        tracing::warn!(
                            config_key = config_keys::MULTIPLE_FIELD_DELIMITER,
                            raw_value = %v,
                            "字段分隔符必须为单个字符且不能为 '|' 或 '='，使用默认值"
                        );
                        DEFAULT_FIELD_DELIMITER
                    }
                }
            }
        };
        Ok(delimiter)
    }

    fn get_artefact_export_dir(&self) -> ImportResult<PathBuf> {
        let value = self.get_config_or_default(config_keys::ARTEFACT_EXPORT_DIR, ".")?;
        Ok(PathBuf::from(value))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const CLEAN_UP_TIER_PRICES: &str = "clean-up-tier-prices";
    pub const DEBUG_MODE: &str = "debug-mode";
    pub const CHECK_WEBSITE_ASSIGNMENT: &str = "check-website-assignment";

    // 代码别名（JSON 对象）
    pub const CUSTOMER_GROUP_CODE_MAPPINGS: &str = "customer-group-code-mappings";
    pub const WEBSITE_CODE_MAPPINGS: &str = "website-code-mappings";

    pub const PRIMARY_KEY_MEMBER: &str = "primary-key-member";
    pub const IMPORT_MODE: &str = "import-mode";
    pub const MULTIPLE_FIELD_DELIMITER: &str = "multiple-field-delimiter";
    pub const ARTEFACT_EXPORT_DIR: &str = "artefact-export-dir";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierPriceImportConfig;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, PrimaryKeyMember::EntityId).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = manager().load_import_config().unwrap();
        assert_eq!(config, TierPriceImportConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let m = manager();
        m.set_global_config_value(config_keys::CLEAN_UP_TIER_PRICES, "false").unwrap();
        m.set_global_config_value(config_keys::DEBUG_MODE, "1").unwrap();
        m.set_global_config_value(
            config_keys::CUSTOMER_GROUP_CODE_MAPPINGS,
            r#"{"Retail": "General"}"#,
        )
        .unwrap();
        m.set_global_config_value(config_keys::PRIMARY_KEY_MEMBER, "row_id").unwrap();
        m.set_global_config_value(config_keys::IMPORT_MODE, "artefact-export").unwrap();
        m.set_global_config_value(config_keys::MULTIPLE_FIELD_DELIMITER, ";").unwrap();

        let config = m.load_import_config().unwrap();
        assert!(!config.clean_up_tier_prices);
        assert!(config.debug_mode);
        assert_eq!(
            config.customer_group_code_mappings.get("Retail"),
            Some(&"General".to_string())
        );
        assert_eq!(config.primary_key_member, PrimaryKeyMember::RowId);
        assert_eq!(config.import_mode, ImportMode::ArtefactExport);
        assert_eq!(config.field_delimiter, ';');
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let m = manager();
        m.set_global_config_value(config_keys::CHECK_WEBSITE_ASSIGNMENT, "maybe").unwrap();
        m.set_global_config_value(config_keys::WEBSITE_CODE_MAPPINGS, "not json").unwrap();
        m.set_global_config_value(config_keys::MULTIPLE_FIELD_DELIMITER, "||").unwrap();

        assert!(m.get_check_website_assignment().unwrap());
        assert!(m.get_website_code_mappings().unwrap().is_empty());
        assert_eq!(m.get_field_delimiter().unwrap(), DEFAULT_FIELD_DELIMITER);
    }

    #[test]
    fn test_invalid_primary_key_member_rejected() {
        let m = manager();
        m.set_global_config_value(config_keys::PRIMARY_KEY_MEMBER, "sku").unwrap();
        assert!(matches!(
            m.get_primary_key_member().unwrap_err(),
            ImportError::ConfigValueError { .. }
        ));
    }
}
