// ==========================================
// 产品阶梯价导入 - 客户组仓储
// ==========================================
// 职责: 读取 customer_group（customer_group_code → customer_group_id）
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct CustomerGroupRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CustomerGroupRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 读取全部客户组，按 code 建索引
    pub fn find_all(&self) -> RepositoryResult<HashMap<String, i64>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT customer_group_code, customer_group_id FROM customer_group")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut groups = HashMap::new();
        for row in rows {
            let (code, id) = row?;
            groups.insert(code, id);
        }
        Ok(groups)
    }
}
