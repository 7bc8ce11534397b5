// ==========================================
// 产品阶梯价导入 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少宿主并发写入时的偶发 busy 错误
// - 提供导入所需的最小 schema（产品/网站/客户组/阶梯价/配置）
// ==========================================

use crate::domain::PrimaryKeyMember;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 阶梯价表名
pub const TIER_PRICE_TABLE: &str = "catalog_product_entity_tier_price";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化 schema（幂等）
///
/// # 参数
/// - pk_member: 阶梯价表外键列名（entity_id / row_id），启动时一次性决定
pub fn init_schema(conn: &Connection, pk_member: PrimaryKeyMember) -> rusqlite::Result<()> {
    let pk = pk_member.column_name();

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS catalog_product_entity (
            entity_id INTEGER PRIMARY KEY,
            row_id INTEGER UNIQUE,
            sku TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS store_website (
            website_id INTEGER PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT
        );

        CREATE TABLE IF NOT EXISTS customer_group (
            customer_group_id INTEGER PRIMARY KEY,
            customer_group_code TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS catalog_product_website (
            product_id INTEGER NOT NULL REFERENCES catalog_product_entity(entity_id) ON DELETE CASCADE,
            website_id INTEGER NOT NULL REFERENCES store_website(website_id) ON DELETE CASCADE,
            PRIMARY KEY (product_id, website_id)
        );
        "#,
    )?;

    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            value_id INTEGER PRIMARY KEY AUTOINCREMENT,
            {pk} INTEGER NOT NULL REFERENCES catalog_product_entity({pk}) ON DELETE CASCADE,
            all_groups INTEGER NOT NULL DEFAULT 1,
            customer_group_id INTEGER NOT NULL DEFAULT 0,
            qty REAL NOT NULL DEFAULT 1,
            value REAL NOT NULL DEFAULT 0,
            website_id INTEGER NOT NULL,
            percentage_value REAL,
            UNIQUE ({pk}, all_groups, customer_group_id, qty, website_id)
        );
        "#,
        table = TIER_PRICE_TABLE,
        pk = pk,
    ))?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
