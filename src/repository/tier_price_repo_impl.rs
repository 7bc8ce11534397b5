// ==========================================
// 产品阶梯价导入 - 阶梯价 Repository 实现
// ==========================================
// 职责: 实现阶梯价数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 说明: 每条写入立即生效（autocommit），批次级事务由宿主决定
// ==========================================

use crate::db::{open_sqlite_connection, TIER_PRICE_TABLE};
use crate::domain::{ParentKey, PrimaryKeyMember, RecordId, TierPriceRecord, ValueType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::tier_price_repo::TierPriceRepository;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SqliteTierPriceRepository
// ==========================================
pub struct SqliteTierPriceRepository {
    conn: Arc<Mutex<Connection>>,
    pk_member: PrimaryKeyMember,
}

impl SqliteTierPriceRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - pk_member: 产品主键列（entity_id / row_id）
    pub fn new(db_path: &str, pk_member: PrimaryKeyMember) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            pk_member,
        })
    }

    /// 从已有连接创建（与配置/产品仓储共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>, pk_member: PrimaryKeyMember) -> Self {
        Self { conn, pk_member }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行 → 记录（percentage_value 为 NULL 视为 Fixed）
    fn map_row(row: &Row<'_>) -> rusqlite::Result<TierPriceRecord> {
        let record_id: i64 = row.get(0)?;
        let parent_key: i64 = row.get(1)?;
        let all_groups: i64 = row.get(2)?;
        let customer_group_id: i64 = row.get(3)?;
        let qty: f64 = row.get(4)?;
        let value: f64 = row.get(5)?;
        let website_id: i64 = row.get(6)?;
        let percentage_value: Option<f64> = row.get(7)?;

        let (value_type, price) = match percentage_value {
            Some(pct) => (ValueType::Discount, pct),
            None => (ValueType::Fixed, value),
        };

        Ok(TierPriceRecord::new(
            ParentKey(parent_key),
            qty,
            value_type,
            price,
            website_id,
            customer_group_id,
            all_groups != 0,
        )
        .with_record_id(RecordId(record_id)))
    }
}

impl TierPriceRepository for SqliteTierPriceRepository {
    fn find_all(&self) -> RepositoryResult<Vec<TierPriceRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT value_id, {pk}, all_groups, customer_group_id, qty, value, website_id, percentage_value
            FROM {table}
            ORDER BY value_id
            "#,
            pk = self.pk_member.column_name(),
            table = TIER_PRICE_TABLE,
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn create(&self, record: &TierPriceRecord) -> RepositoryResult<RecordId> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            INSERT INTO {table} (
                all_groups, customer_group_id, qty, value, website_id, percentage_value, {pk}
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            pk = self.pk_member.column_name(),
            table = TIER_PRICE_TABLE,
        );

        conn.execute(
            &sql,
            params![
                record.all_groups as i64,
                record.customer_group_id,
                record.qty,
                record.value.unwrap_or(0.0),
                record.website_id,
                record.percentage_value,
                record.parent_key.0,
            ],
        )?;

        Ok(RecordId(conn.last_insert_rowid()))
    }

    fn update(&self, record: &TierPriceRecord, record_id: RecordId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            UPDATE {table}
               SET all_groups = ?1,
                   customer_group_id = ?2,
                   qty = ?3,
                   value = ?4,
                   website_id = ?5,
                   percentage_value = ?6,
                   {pk} = ?7
             WHERE value_id = ?8
            "#,
            pk = self.pk_member.column_name(),
            table = TIER_PRICE_TABLE,
        );

        let affected = conn.execute(
            &sql,
            params![
                record.all_groups as i64,
                record.customer_group_id,
                record.qty,
                record.value.unwrap_or(0.0),
                record.website_id,
                record.percentage_value,
                record.parent_key.0,
                record_id.0,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: TIER_PRICE_TABLE.to_string(),
                id: record_id.to_string(),
            });
        }
        Ok(())
    }

    fn delete(&self, record_id: RecordId) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            &format!("DELETE FROM {} WHERE value_id = ?1", TIER_PRICE_TABLE),
            params![record_id.0],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: TIER_PRICE_TABLE.to_string(),
                id: record_id.to_string(),
            });
        }
        Ok(())
    }
}
