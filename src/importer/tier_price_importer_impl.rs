// ==========================================
// 产品阶梯价导入 - 导入生命周期实现
// ==========================================
// DirectReconciler: 逐行对账并立即持久化，批次结束清理过期阶梯价
// ArtefactExportReconciler: 逐行解析并暂存，批次结束写出产物文件
// 调试模式: 行级错误降级为告警并跳过当前行；网关错误始终中止
// ==========================================

use crate::config::TierPriceImportConfig;
use crate::domain::{column_keys, default_codes, ImportMode, ImportRow, TierPriceArtefact};
use crate::importer::artefact_exporter::ArtefactExporter;
use crate::importer::code_resolver::StoreCodeResolver;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::obsolete_sweeper::ObsoleteSweeper;
use crate::importer::reconciliation::{ReconcileOutcome, ReconciliationEngine};
use crate::importer::row_parser::TierPriceRowParser;
use crate::importer::run_context::{RunContext, RunReport};
use crate::importer::tier_price_importer_trait::{CodeResolver, RowOutcome, TierPriceReconciler};
use crate::repository::{
    CustomerGroupRepository, ProductLookup, SqliteProductRepository, SqliteTierPriceRepository,
    StoreWebsiteRepository, TierPriceRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// 调试模式下行级错误降级为跳过
fn handle_row_error(
    ctx: &mut RunContext,
    row: &ImportRow,
    err: ImportError,
    debug_mode: bool,
) -> ImportResult<RowOutcome> {
    if debug_mode && err.is_row_scoped() {
        warn!(
            row_number = row.row_number,
            sku = %row.sku(),
            error = %err,
            "调试模式: 跳过错误行"
        );
        ctx.stats_mut().rows_skipped += 1;
        return Ok(RowOutcome {
            row_skipped: true,
            ..RowOutcome::default()
        });
    }

    error!(
        row_number = row.row_number,
        sku = %row.sku(),
        error = %err,
        "阶梯价导入中止"
    );
    Err(err)
}

fn is_delete_row(row: &ImportRow) -> bool {
    row.get(column_keys::OPERATION)
        .map(|op| op.trim().eq_ignore_ascii_case(default_codes::OPERATION_DELETE))
        .unwrap_or(false)
}

// ==========================================
// DirectReconciler - 直接持久化模式
// ==========================================
pub struct DirectReconciler<P, R, C>
where
    P: ProductLookup,
    R: TierPriceRepository,
    C: CodeResolver,
{
    products: P,
    engine: ReconciliationEngine<R, C>,
    parser: TierPriceRowParser,
    sweeper: ObsoleteSweeper,
    clean_up_tier_prices: bool,
    debug_mode: bool,
}

impl<P, R, C> DirectReconciler<P, R, C>
where
    P: ProductLookup,
    R: TierPriceRepository,
    C: CodeResolver,
{
    pub fn new(
        products: P,
        engine: ReconciliationEngine<R, C>,
        parser: TierPriceRowParser,
        clean_up_tier_prices: bool,
        debug_mode: bool,
    ) -> Self {
        Self {
            products,
            engine,
            parser,
            sweeper: ObsoleteSweeper::new(),
            clean_up_tier_prices,
            debug_mode,
        }
    }

    pub fn engine(&self) -> &ReconciliationEngine<R, C> {
        &self.engine
    }

    fn process_row(&mut self, ctx: &mut RunContext, row: &ImportRow) -> ImportResult<RowOutcome> {
        let mut outcome = RowOutcome::default();

        if !self.parser.is_admin_row(row) {
            debug!(row_number = row.row_number, "非 admin 视图行，跳过");
            return Ok(outcome);
        }

        let sku = row.sku();
        if sku.is_empty() {
            return Err(ImportError::MissingField {
                sku: String::new(),
                field: column_keys::SKU.to_string(),
            });
        }

        let product = self
            .products
            .load_product(sku)?
            .ok_or_else(|| ImportError::ProductNotFound(sku.to_string()))?;

        let artefacts = self.parser.parse_row(row)?;

        // 先校验整行：任一条目出错则整行跳过，不写库也不触达产品
        let records = artefacts
            .iter()
            .map(|artefact| self.engine.prepare(&product, artefact))
            .collect::<ImportResult<Vec<_>>>()?;

        if is_delete_row(row) {
            for record in &records {
                outcome.cleared += self.engine.clear_record(&product, record)?.len();
            }
            return Ok(outcome);
        }

        // 空 tier_prices 也视为触达：批次结束时该产品的阶梯价全部清理
        ctx.touch_parent(product.parent_key);

        for (artefact, record) in artefacts.iter().zip(records) {
            match self.engine.reconcile_record(ctx, &product, artefact, record)? {
                ReconcileOutcome::Created(_) => outcome.created += 1,
                ReconcileOutcome::Updated(_) => outcome.updated += 1,
                ReconcileOutcome::Unchanged(_) => outcome.unchanged += 1,
                ReconcileOutcome::Skipped => outcome.entries_skipped += 1,
            }
        }

        Ok(outcome)
    }
}

impl<P, R, C> TierPriceReconciler for DirectReconciler<P, R, C>
where
    P: ProductLookup,
    R: TierPriceRepository,
    C: CodeResolver,
{
    fn mode(&self) -> ImportMode {
        ImportMode::Direct
    }

    fn on_run_start(&mut self) -> ImportResult<RunContext> {
        self.engine.reset();
        Ok(RunContext::new())
    }

    fn on_row_processed(
        &mut self,
        ctx: &mut RunContext,
        row: &ImportRow,
    ) -> ImportResult<RowOutcome> {
        ctx.stats_mut().rows_processed += 1;

        match self.process_row(ctx, row) {
            Ok(outcome) => {
                let stats = ctx.stats_mut();
                stats.created += outcome.created;
                stats.updated += outcome.updated;
                stats.unchanged += outcome.unchanged;
                stats.entries_skipped += outcome.entries_skipped;
                stats.cleared += outcome.cleared;
                Ok(outcome)
            }
            Err(err) => handle_row_error(ctx, row, err, self.debug_mode),
        }
    }

    fn on_run_end(&mut self, mut ctx: RunContext) -> ImportResult<RunReport> {
        let swept = if self.clean_up_tier_prices {
            let sweep = self.sweeper.sweep(&mut self.engine, &ctx)?;
            ctx.stats_mut().deleted_obsolete = sweep.deleted.len();
            true
        } else {
            debug!("未开启过期阶梯价清理");
            false
        };

        self.engine.reset();
        Ok(ctx.into_report(ImportMode::Direct, swept, None))
    }
}

// ==========================================
// ArtefactExportReconciler - 产物导出模式
// ==========================================
pub struct ArtefactExportReconciler {
    parser: TierPriceRowParser,
    exporter: ArtefactExporter,
    staged: Vec<TierPriceArtefact>,
    debug_mode: bool,
}

impl ArtefactExportReconciler {
    pub fn new(parser: TierPriceRowParser, exporter: ArtefactExporter, debug_mode: bool) -> Self {
        Self {
            parser,
            exporter,
            staged: Vec::new(),
            debug_mode,
        }
    }

    pub fn staged(&self) -> &[TierPriceArtefact] {
        &self.staged
    }
}

impl TierPriceReconciler for ArtefactExportReconciler {
    fn mode(&self) -> ImportMode {
        ImportMode::ArtefactExport
    }

    fn on_run_start(&mut self) -> ImportResult<RunContext> {
        self.staged.clear();
        Ok(RunContext::new())
    }

    fn on_row_processed(
        &mut self,
        ctx: &mut RunContext,
        row: &ImportRow,
    ) -> ImportResult<RowOutcome> {
        ctx.stats_mut().rows_processed += 1;

        if is_delete_row(row) {
            warn!(
                row_number = row.row_number,
                sku = %row.sku(),
                "产物导出模式不支持 delete 操作，该行未写入产物"
            );
            ctx.stats_mut().rows_skipped += 1;
            return Ok(RowOutcome {
                row_skipped: true,
                ..RowOutcome::default()
            });
        }

        match self.parser.parse_row(row) {
            Ok(artefacts) => {
                let outcome = RowOutcome {
                    staged: artefacts.len(),
                    ..RowOutcome::default()
                };
                self.staged.extend(artefacts);
                Ok(outcome)
            }
            Err(err) => handle_row_error(ctx, row, err, self.debug_mode),
        }
    }

    fn on_run_end(&mut self, mut ctx: RunContext) -> ImportResult<RunReport> {
        let artefacts = std::mem::take(&mut self.staged);
        if artefacts.is_empty() {
            info!("无阶梯价产物，跳过导出");
            return Ok(ctx.into_report(ImportMode::ArtefactExport, false, None));
        }

        let path = self.exporter.export(&artefacts, ctx.started_at())?;
        ctx.stats_mut().artefacts_exported = artefacts.len();
        Ok(ctx.into_report(ImportMode::ArtefactExport, false, Some(path)))
    }
}

// ==========================================
// 按配置构造导入实现
// ==========================================
pub fn build_reconciler(
    config: &TierPriceImportConfig,
    conn: Arc<Mutex<Connection>>,
) -> ImportResult<Box<dyn TierPriceReconciler>> {
    let parser = TierPriceRowParser::new(config.field_delimiter);

    match config.import_mode {
        ImportMode::Direct => {
            let resolver = StoreCodeResolver::load(
                &StoreWebsiteRepository::from_connection(conn.clone()),
                &CustomerGroupRepository::from_connection(conn.clone()),
                config,
            )?;
            let repo = SqliteTierPriceRepository::from_connection(
                conn.clone(),
                config.primary_key_member,
            );
            let products =
                SqliteProductRepository::from_connection(conn, config.primary_key_member);
            let engine =
                ReconciliationEngine::new(repo, resolver, config.check_website_assignment);

            Ok(Box::new(DirectReconciler::new(
                products,
                engine,
                parser,
                config.clean_up_tier_prices,
                config.debug_mode,
            )))
        }
        ImportMode::ArtefactExport => Ok(Box::new(ArtefactExportReconciler::new(
            parser,
            ArtefactExporter::new(config.artefact_export_dir.clone()),
            config.debug_mode,
        ))),
    }
}
