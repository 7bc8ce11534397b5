// ==========================================
// 产品阶梯价导入 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 职责: 解析产品导入文件中的阶梯价，与已持久化记录对账，清理过期记录
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 解析 / 对账 / 清理
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ImportMode, ImportRow, ParentKey, PrimaryKeyMember, ProductRef, RecordId, TierPriceArtefact,
    TierPriceRecord, ValueType,
};

// 导入
pub use importer::{ImportError, ImportResult, RunReport, TierPriceImporter};

// 配置
pub use config::{ConfigManager, TierPriceConfigReader, TierPriceImportConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "产品阶梯价导入";
