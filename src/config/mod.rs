// ==========================================
// 产品阶梯价导入 - 配置层
// ==========================================
// 职责: 导入配置读取（只读快照），支持命令行覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config::TierPriceImportConfig;
pub use import_config_trait::TierPriceConfigReader;
