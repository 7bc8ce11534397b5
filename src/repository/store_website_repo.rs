// ==========================================
// 产品阶梯价导入 - 网站仓储
// ==========================================
// 职责: 读取 store_website（code → website_id）
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct StoreWebsiteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StoreWebsiteRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 读取全部网站，按 code 建索引
    pub fn find_all(&self) -> RepositoryResult<HashMap<String, i64>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare("SELECT code, website_id FROM store_website")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut websites = HashMap::new();
        for row in rows {
            let (code, id) = row?;
            websites.insert(code, id);
        }
        Ok(websites)
    }
}
