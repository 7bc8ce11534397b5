// ==========================================
// 产品阶梯价导入 - 过期阶梯价清理
// ==========================================
// 规则: 父产品在本批次被触达，但记录未在本批次出现 → 删除
// 时机: 全部行处理完毕之后（仅 clean-up-tier-prices 开启时）
// 失败: 网关错误中止清理，已执行的删除不回滚
// ==========================================

use crate::domain::RecordId;
use crate::importer::error::ImportResult;
use crate::importer::reconciliation::ReconciliationEngine;
use crate::importer::run_context::RunContext;
use crate::importer::tier_price_importer_trait::CodeResolver;
use crate::repository::TierPriceRepository;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub deleted: Vec<RecordId>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObsoleteSweeper;

impl ObsoleteSweeper {
    pub fn new() -> Self {
        Self
    }

    pub fn sweep<R: TierPriceRepository, C: CodeResolver>(
        &self,
        engine: &mut ReconciliationEngine<R, C>,
        ctx: &RunContext,
    ) -> ImportResult<SweepReport> {
        let mut records = engine.indexed_records()?;
        records.sort_by_key(|r| r.record_id);

        let mut report = SweepReport {
            examined: records.len(),
            deleted: Vec::new(),
        };

        for record in records {
            let record_id = match record.record_id {
                Some(id) => id,
                None => continue,
            };
            if ctx.is_seen(record_id) || !ctx.is_touched(record.parent_key) {
                continue;
            }

            engine.delete_record(&record)?;
            tracing::debug!(
                parent_key = %record.parent_key,
                record_id = %record_id,
                "过期阶梯价已删除"
            );
            report.deleted.push(record_id);
        }

        tracing::info!(
            examined = report.examined,
            deleted = report.deleted.len(),
            "过期阶梯价清理完成"
        );
        Ok(report)
    }
}
