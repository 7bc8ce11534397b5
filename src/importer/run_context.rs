// ==========================================
// 产品阶梯价导入 - 导入批次上下文
// ==========================================
// 职责: 保存单次导入批次的"已见记录"与"已触达产品"
// 生命周期: on_run_start 创建 → 每行传入 → on_run_end 消费
// ==========================================

use crate::domain::{ImportMode, ParentKey, RecordId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use uuid::Uuid;

// ==========================================
// RunStats - 批次统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub rows_processed: usize,
    pub rows_skipped: usize,     // 调试模式下跳过的行
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub entries_skipped: usize,  // 网站未分配等告警跳过的条目
    pub cleared: usize,          // delete 操作删除的记录
    pub deleted_obsolete: usize, // 过期清理删除的记录
    pub artefacts_exported: usize,
}

// ==========================================
// RunContext
// ==========================================
#[derive(Debug)]
pub struct RunContext {
    serial: String,
    started_at: DateTime<Utc>,
    seen: HashMap<RecordId, ParentKey>,
    touched: HashSet<ParentKey>,
    stats: RunStats,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            serial: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            seen: HashMap::new(),
            touched: HashSet::new(),
            stats: RunStats::default(),
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 标记记录在本批次中已出现
    pub fn mark_seen(&mut self, record_id: RecordId, parent_key: ParentKey) {
        self.seen.insert(record_id, parent_key);
    }

    pub fn is_seen(&self, record_id: RecordId) -> bool {
        self.seen.contains_key(&record_id)
    }

    pub fn seen(&self) -> &HashMap<RecordId, ParentKey> {
        &self.seen
    }

    /// 标记产品在本批次中被触达（无论是否携带阶梯价）
    pub fn touch_parent(&mut self, parent_key: ParentKey) {
        self.touched.insert(parent_key);
    }

    pub fn is_touched(&self, parent_key: ParentKey) -> bool {
        self.touched.contains(&parent_key)
    }

    pub fn touched(&self) -> &HashSet<ParentKey> {
        &self.touched
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut RunStats {
        &mut self.stats
    }

    /// 结束批次，生成报告
    pub fn into_report(self, mode: ImportMode, swept: bool, export_file: Option<PathBuf>) -> RunReport {
        RunReport {
            serial: self.serial,
            mode,
            started_at: self.started_at,
            finished_at: Utc::now(),
            touched_parents: self.touched.len(),
            seen_records: self.seen.len(),
            stats: self.stats,
            swept,
            export_file,
        }
    }
}

// ==========================================
// RunReport - 批次报告
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub serial: String,
    pub mode: ImportMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub touched_parents: usize,
    pub seen_records: usize,
    pub stats: RunStats,
    pub swept: bool,
    pub export_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_and_touched() {
        let mut ctx = RunContext::new();
        ctx.mark_seen(RecordId(1), ParentKey(10));
        ctx.touch_parent(ParentKey(10));
        ctx.touch_parent(ParentKey(10));
        ctx.touch_parent(ParentKey(11));

        assert!(ctx.is_seen(RecordId(1)));
        assert!(!ctx.is_seen(RecordId(2)));
        assert!(ctx.is_touched(ParentKey(11)));
        assert_eq!(ctx.touched().len(), 2);

        ctx.stats_mut().created += 1;
        let report = ctx.into_report(ImportMode::Direct, true, None);
        assert_eq!(report.touched_parents, 2);
        assert_eq!(report.seen_records, 1);
        assert_eq!(report.stats.created, 1);
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn test_serial_is_unique_per_run() {
        assert_ne!(RunContext::new().serial(), RunContext::new().serial());
    }
}
