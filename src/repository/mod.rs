// ==========================================
// 产品阶梯价导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod customer_group_repo;
pub mod error;
pub mod product_repo;
pub mod store_website_repo;
pub mod tier_price_repo;
pub mod tier_price_repo_impl;

// 重导出核心仓储
pub use customer_group_repo::CustomerGroupRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use product_repo::{ProductLookup, SqliteProductRepository};
pub use store_website_repo::StoreWebsiteRepository;
pub use tier_price_repo::TierPriceRepository;
pub use tier_price_repo_impl::SqliteTierPriceRepository;
