// ==========================================
// 产品阶梯价导入 - 阶梯价 Repository Trait（持久化网关）
// ==========================================
// 职责: 定义阶梯价数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::{RecordId, TierPriceRecord};
use crate::repository::error::RepositoryResult;

// ==========================================
// TierPriceRepository Trait
// ==========================================
// 用途: 对账引擎读取全量阶梯价、逐条写入
// 实现者: SqliteTierPriceRepository（使用 rusqlite）
pub trait TierPriceRepository {
    /// 读取全部阶梯价
    ///
    /// # 返回
    /// - Ok(Vec<TierPriceRecord>): 每条记录均带 record_id
    fn find_all(&self) -> RepositoryResult<Vec<TierPriceRecord>>;

    /// 新建阶梯价
    ///
    /// # 返回
    /// - Ok(RecordId): 数据库分配的 value_id
    /// - Err: 唯一约束违反等数据库错误
    fn create(&self, record: &TierPriceRecord) -> RepositoryResult<RecordId>;

    /// 按 record_id 原位更新（忽略 record.record_id）
    fn update(&self, record: &TierPriceRecord, record_id: RecordId) -> RepositoryResult<()>;

    /// 按 record_id 删除
    fn delete(&self, record_id: RecordId) -> RepositoryResult<()>;
}
