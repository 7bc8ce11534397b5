// ==========================================
// 产品阶梯价导入 - 导入接口 Trait
// ==========================================
// 职责: 定义阶梯价导入各阶段接口（不包含实现）
// 生命周期: on_run_start → on_row_processed × N → on_run_end
// ==========================================

use crate::domain::{ImportMode, ImportRow};
use crate::importer::error::ImportResult;
use crate::importer::run_context::{RunContext, RunReport};
use std::path::Path;

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowOutcome {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub entries_skipped: usize,
    pub cleared: usize,
    pub staged: usize, // artefact-export 模式暂存的产物
    pub row_skipped: bool,
}

// ==========================================
// TierPriceReconciler Trait
// ==========================================
// 用途: 导入批次生命周期钩子
// 实现者: DirectReconciler, ArtefactExportReconciler
pub trait TierPriceReconciler {
    /// 当前实现对应的导入模式
    fn mode(&self) -> ImportMode;

    /// 批次开始，创建本批次上下文
    fn on_run_start(&mut self) -> ImportResult<RunContext>;

    /// 处理一行导入数据
    ///
    /// # 返回
    /// - Ok(RowOutcome): 行处理结果（调试模式下行级错误也返回 Ok，row_skipped = true）
    /// - Err: 行级错误（非调试模式）、持久化错误
    fn on_row_processed(
        &mut self,
        ctx: &mut RunContext,
        row: &ImportRow,
    ) -> ImportResult<RowOutcome>;

    /// 批次结束（清理过期阶梯价 / 写出产物），消费上下文
    fn on_run_end(&mut self, ctx: RunContext) -> ImportResult<RunReport>;
}

// ==========================================
// CodeResolver Trait
// ==========================================
// 用途: 网站/客户组代码 → ID
// 实现者: StoreCodeResolver
pub trait CodeResolver {
    /// 解析网站代码（"All Websites" → 0）
    fn resolve_website_id(&self, code: &str) -> ImportResult<i64>;

    /// 解析客户组代码（"ALL GROUPS" → 0）
    fn resolve_customer_group_id(&self, code: &str) -> ImportResult<i64>;

    /// 是否为"所有客户组"
    fn is_all_groups(&self, code: &str) -> bool;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser
pub trait FileParser {
    /// 解析文件为导入行（行号从 1 开始，不含表头）
    fn parse_to_rows(&self, file_path: &Path) -> ImportResult<Vec<ImportRow>>;
}
