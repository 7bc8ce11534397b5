// ==========================================
// 产品阶梯价导入 - 导入驱动
// ==========================================
// 流程: on_run_start → 逐行 on_row_processed → on_run_end
// 失败: 任一行返回错误即中止（不调用 on_run_end，已写入的记录不回滚）
// ==========================================

use crate::config::TierPriceImportConfig;
use crate::domain::ImportRow;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::CsvParser;
use crate::importer::run_context::RunReport;
use crate::importer::tier_price_importer_impl::build_reconciler;
use crate::importer::tier_price_importer_trait::{FileParser, TierPriceReconciler};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, instrument};

pub struct TierPriceImporter {
    reconciler: Box<dyn TierPriceReconciler>,
    file_parser: Box<dyn FileParser>,
}

impl TierPriceImporter {
    pub fn new(reconciler: Box<dyn TierPriceReconciler>) -> Self {
        Self {
            reconciler,
            file_parser: Box::new(CsvParser),
        }
    }

    /// 按配置构造（模式由 import_mode 决定）
    pub fn from_config(
        config: &TierPriceImportConfig,
        conn: Arc<Mutex<Connection>>,
    ) -> ImportResult<Self> {
        Ok(Self::new(build_reconciler(config, conn)?))
    }

    pub fn with_file_parser(mut self, file_parser: Box<dyn FileParser>) -> Self {
        self.file_parser = file_parser;
        self
    }

    /// 执行一个导入批次
    pub fn run(&mut self, rows: &[ImportRow]) -> ImportResult<RunReport> {
        let start = Instant::now();
        let mode = self.reconciler.mode();

        let mut ctx = self.reconciler.on_run_start()?;
        info!(serial = %ctx.serial(), mode = %mode.as_str(), rows = rows.len(), "阶梯价导入开始");

        for row in rows {
            self.reconciler.on_row_processed(&mut ctx, row)?;
        }

        let report = self.reconciler.on_run_end(ctx)?;
        info!(
            serial = %report.serial,
            mode = %mode.as_str(),
            rows_processed = report.stats.rows_processed,
            rows_skipped = report.stats.rows_skipped,
            created = report.stats.created,
            updated = report.stats.updated,
            unchanged = report.stats.unchanged,
            deleted_obsolete = report.stats.deleted_obsolete,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "阶梯价导入完成"
        );

        Ok(report)
    }

    /// 解析文件并执行导入批次
    #[instrument(skip_all, fields(path = %file_path.display()))]
    pub fn import_file(&mut self, file_path: &Path) -> ImportResult<RunReport> {
        let rows = self.file_parser.parse_to_rows(file_path)?;
        self.run(&rows)
    }
}
