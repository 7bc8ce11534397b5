// ==========================================
// 产品阶梯价导入 - 导入层
// ==========================================
// 流程: 文件解析 → 行解析 → 对账（新建/更新/无变化）→ 过期清理
// 模式: direct（直接持久化）/ artefact-export（导出产物文件）
// ==========================================

// 模块声明
pub mod artefact_exporter;
pub mod code_resolver;
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod obsolete_sweeper;
pub mod reconciliation;
pub mod row_parser;
pub mod run_context;
pub mod tier_price_hasher;
pub mod tier_price_importer;
pub mod tier_price_importer_impl;
pub mod tier_price_importer_trait;
pub mod value_types;

// 重导出核心类型
pub use artefact_exporter::ArtefactExporter;
pub use code_resolver::StoreCodeResolver;
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use file_parser::CsvParser;
pub use obsolete_sweeper::{ObsoleteSweeper, SweepReport};
pub use reconciliation::{ReconcileOutcome, ReconciliationEngine};
pub use row_parser::TierPriceRowParser;
pub use run_context::{RunContext, RunReport, RunStats};
pub use tier_price_hasher::{natural_key, tier_prices_equal};
pub use tier_price_importer::TierPriceImporter;
pub use tier_price_importer_impl::{build_reconciler, ArtefactExportReconciler, DirectReconciler};
pub use value_types::ValueTypes;

// 重导出 Trait 接口
pub use tier_price_importer_trait::{CodeResolver, FileParser, RowOutcome, TierPriceReconciler};
