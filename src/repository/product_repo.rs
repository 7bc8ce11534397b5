// ==========================================
// 产品阶梯价导入 - 产品仓储
// ==========================================
// 职责: SKU → 产品主键 + 已分配网站
// 说明: 主键列由 PrimaryKeyMember 决定，构造时固定
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{ParentKey, PrimaryKeyMember, ProductRef};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ProductLookup Trait
// ==========================================
// 实现者: SqliteProductRepository
pub trait ProductLookup {
    /// 按 SKU 读取产品
    ///
    /// # 返回
    /// - Ok(Some(ProductRef)): 产品存在
    /// - Ok(None): 产品不存在
    fn load_product(&self, sku: &str) -> RepositoryResult<Option<ProductRef>>;
}

pub struct SqliteProductRepository {
    conn: Arc<Mutex<Connection>>,
    pk_member: PrimaryKeyMember,
}

impl SqliteProductRepository {
    pub fn new(db_path: &str, pk_member: PrimaryKeyMember) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            pk_member,
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>, pk_member: PrimaryKeyMember) -> Self {
        Self { conn, pk_member }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl ProductLookup for SqliteProductRepository {
    fn load_product(&self, sku: &str) -> RepositoryResult<Option<ProductRef>> {
        let conn = self.get_conn()?;

        let found: Option<(i64, Option<i64>)> = conn
            .query_row(
                "SELECT entity_id, row_id FROM catalog_product_entity WHERE sku = ?1",
                params![sku],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (entity_id, row_id) = match found {
            Some(v) => v,
            None => return Ok(None),
        };

        let parent_key = match self.pk_member {
            PrimaryKeyMember::EntityId => entity_id,
            PrimaryKeyMember::RowId => row_id.ok_or_else(|| RepositoryError::FieldValueError {
                field: "row_id".to_string(),
                message: format!("产品 {} 缺少 row_id", sku),
            })?,
        };

        let mut stmt = conn.prepare(
            "SELECT website_id FROM catalog_product_website WHERE product_id = ?1 ORDER BY website_id",
        )?;
        let website_ids = stmt
            .query_map(params![entity_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ProductRef {
            sku: sku.to_string(),
            parent_key: ParentKey(parent_key),
            website_ids,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup(pk_member: PrimaryKeyMember) -> SqliteProductRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, pk_member).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO store_website (website_id, code) VALUES (1, 'base'), (2, 'b2b');
            INSERT INTO catalog_product_entity (entity_id, row_id, sku) VALUES (7, 70, 'SKU-7');
            INSERT INTO catalog_product_entity (entity_id, sku) VALUES (8, 'SKU-8');
            INSERT INTO catalog_product_website (product_id, website_id) VALUES (7, 2), (7, 1);
            "#,
        )
        .unwrap();
        SqliteProductRepository::from_connection(Arc::new(Mutex::new(conn)), pk_member)
    }

    #[test]
    fn test_load_product_with_websites() {
        let repo = setup(PrimaryKeyMember::EntityId);
        let product = repo.load_product("SKU-7").unwrap().unwrap();
        assert_eq!(product.parent_key, ParentKey(7));
        assert_eq!(product.website_ids, vec![1, 2]);
        assert!(product.is_assigned_to_website(2));
    }

    #[test]
    fn test_load_product_missing() {
        let repo = setup(PrimaryKeyMember::EntityId);
        assert!(repo.load_product("NOPE").unwrap().is_none());
    }

    #[test]
    fn test_row_id_member_requires_row_id() {
        let repo = setup(PrimaryKeyMember::RowId);
        assert_eq!(
            repo.load_product("SKU-7").unwrap().unwrap().parent_key,
            ParentKey(70)
        );
        assert!(matches!(
            repo.load_product("SKU-8").unwrap_err(),
            RepositoryError::FieldValueError { .. }
        ));
    }
}
