// ==========================================
// 产品阶梯价导入 - 对账引擎
// ==========================================
// 职责: 导入产物 → 阶梯价记录，与已持久化记录按自然键对账
// 索引: 自然键 → 已持久化记录（可重复），首次访问时经 find_all 全量加载，reset() 丢弃
// 结果: 新建 / 原位更新 / 无变化 / 跳过
// ==========================================

use crate::domain::{ProductRef, RecordId, TierPriceArtefact, TierPriceRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::run_context::RunContext;
use crate::importer::tier_price_hasher::{natural_key, tier_prices_equal};
use crate::importer::tier_price_importer_trait::CodeResolver;
use crate::importer::value_types::ValueTypes;
use crate::repository::TierPriceRepository;
use std::collections::HashMap;

// ==========================================
// ReconcileOutcome - 单条产物对账结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(RecordId),
    Updated(RecordId),
    Unchanged(RecordId),
    Skipped, // 网站未分配
}

// ==========================================
// ReconciliationEngine
// ==========================================
pub struct ReconciliationEngine<R: TierPriceRepository, C: CodeResolver> {
    repo: R,
    resolver: C,
    value_types: ValueTypes,
    check_website_assignment: bool,
    index: Option<HashMap<String, Vec<TierPriceRecord>>>,
}

impl<R: TierPriceRepository, C: CodeResolver> ReconciliationEngine<R, C> {
    pub fn new(repo: R, resolver: C, check_website_assignment: bool) -> Self {
        Self {
            repo,
            resolver,
            value_types: ValueTypes::new(),
            check_website_assignment,
            index: None,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 丢弃索引（批次边界调用）
    pub fn reset(&mut self) {
        self.index = None;
    }

    pub fn is_index_loaded(&self) -> bool {
        self.index.is_some()
    }

    fn ensure_index(&mut self) -> ImportResult<&mut HashMap<String, Vec<TierPriceRecord>>> {
        if self.index.is_none() {
            let records = self.repo.find_all()?;
            let total = records.len();
            let mut index: HashMap<String, Vec<TierPriceRecord>> = HashMap::new();
            for record in records {
                index.entry(natural_key(&record)).or_default().push(record);
            }

            // qty 按 4 位小数归一，不同的原始 qty 可能落到同一自然键
            let collisions = total - index.len();
            if collisions > 0 {
                tracing::warn!(collisions, "阶梯价自然键重复，多余记录将由过期清理删除");
            }
            tracing::debug!(records = total, keys = index.len(), "阶梯价索引已加载");
            self.index = Some(index);
        }

        match self.index.as_mut() {
            Some(index) => Ok(index),
            None => Err(ImportError::InternalError("阶梯价索引未初始化".to_string())),
        }
    }

    /// 索引快照（清理器遍历用，包含自然键重复的记录）
    pub fn indexed_records(&mut self) -> ImportResult<Vec<TierPriceRecord>> {
        Ok(self
            .ensure_index()?
            .values()
            .flat_map(|records| records.iter().cloned())
            .collect())
    }

    /// 按自然键查找已持久化记录（重复时取 record_id 最小者）
    pub fn match_record(&mut self, record: &TierPriceRecord) -> ImportResult<Option<TierPriceRecord>> {
        let key = natural_key(record);
        Ok(self.ensure_index()?.get(&key).and_then(|records| primary(records)).cloned())
    }

    /// 产物 → 阶梯价记录（解析代码、校验类型、解析数值）
    pub fn prepare(
        &self,
        product: &ProductRef,
        artefact: &TierPriceArtefact,
    ) -> ImportResult<TierPriceRecord> {
        let value_type = self
            .value_types
            .classify(&artefact.value_type)
            .ok_or_else(|| ImportError::InvalidValueType {
                sku: artefact.sku.clone(),
                value_type: artefact.value_type.clone(),
            })?;

        let qty = parse_number(&artefact.sku, "qty", &artefact.qty)?;
        let price = parse_number(&artefact.sku, "price", &artefact.price)?;

        let website_id = self.resolver.resolve_website_id(&artefact.website)?;
        let customer_group_id = self
            .resolver
            .resolve_customer_group_id(&artefact.customer_group)?;
        let all_groups = self.resolver.is_all_groups(&artefact.customer_group);

        Ok(TierPriceRecord::new(
            product.parent_key,
            qty,
            value_type,
            price,
            website_id,
            customer_group_id,
            all_groups,
        ))
    }

    /// 对账单条产物
    pub fn reconcile(
        &mut self,
        ctx: &mut RunContext,
        product: &ProductRef,
        artefact: &TierPriceArtefact,
    ) -> ImportResult<ReconcileOutcome> {
        let record = self.prepare(product, artefact)?;
        self.reconcile_record(ctx, product, artefact, record)
    }

    /// 对账已 prepare 的记录（只会产生网关错误）
    pub fn reconcile_record(
        &mut self,
        ctx: &mut RunContext,
        product: &ProductRef,
        artefact: &TierPriceArtefact,
        record: TierPriceRecord,
    ) -> ImportResult<ReconcileOutcome> {
        if self.check_website_assignment
            && record.website_id != 0
            && !product.is_assigned_to_website(record.website_id)
        {
            let warning = ImportError::WebsiteNotAssigned {
                sku: product.sku.clone(),
                website: artefact.website.clone(),
            };
            tracing::warn!(row = artefact.row_number, "{}，跳过该阶梯价", warning);
            return Ok(ReconcileOutcome::Skipped);
        }

        let key = natural_key(&record);
        let existing = self
            .ensure_index()?
            .get(&key)
            .and_then(|records| primary(records))
            .cloned();

        let outcome = match existing.and_then(|e| e.record_id.map(|id| (e, id))) {
            Some((existing, record_id)) if tier_prices_equal(&existing, &record) => {
                ReconcileOutcome::Unchanged(record_id)
            }
            Some((_, record_id)) => {
                self.repo.update(&record, record_id)?;
                let updated = record.clone().with_record_id(record_id);
                if let Some(slot) = self
                    .ensure_index()?
                    .get_mut(&key)
                    .and_then(|records| records.iter_mut().find(|r| r.record_id == Some(record_id)))
                {
                    *slot = updated;
                }
                tracing::debug!(sku = %product.sku, record_id = %record_id, "阶梯价已更新");
                ReconcileOutcome::Updated(record_id)
            }
            None => {
                let record_id = self.repo.create(&record)?;
                self.ensure_index()?
                    .entry(key)
                    .or_default()
                    .push(record.clone().with_record_id(record_id));
                tracing::debug!(sku = %product.sku, record_id = %record_id, "阶梯价已新建");
                ReconcileOutcome::Created(record_id)
            }
        };

        let record_id = match outcome {
            ReconcileOutcome::Created(id)
            | ReconcileOutcome::Updated(id)
            | ReconcileOutcome::Unchanged(id) => id,
            ReconcileOutcome::Skipped => return Ok(outcome),
        };
        ctx.mark_seen(record_id, record.parent_key);

        Ok(outcome)
    }

    /// 删除与产物自然键匹配的已持久化记录（delete 操作）
    pub fn clear(
        &mut self,
        product: &ProductRef,
        artefact: &TierPriceArtefact,
    ) -> ImportResult<Vec<RecordId>> {
        let record = self.prepare(product, artefact)?;
        self.clear_record(product, &record)
    }

    /// 删除自然键下的全部已持久化记录
    pub fn clear_record(
        &mut self,
        product: &ProductRef,
        record: &TierPriceRecord,
    ) -> ImportResult<Vec<RecordId>> {
        let key = natural_key(record);
        let ids: Vec<RecordId> = match self.ensure_index()?.get(&key) {
            Some(records) => records.iter().filter_map(|r| r.record_id).collect(),
            None => return Ok(Vec::new()),
        };

        for record_id in &ids {
            self.repo.delete(*record_id)?;
            tracing::debug!(sku = %product.sku, record_id = %record_id, "阶梯价已删除");
        }
        self.ensure_index()?.remove(&key);

        Ok(ids)
    }

    /// 删除指定记录并移出索引（清理器调用）
    pub fn delete_record(&mut self, record: &TierPriceRecord) -> ImportResult<()> {
        let record_id = record.record_id.ok_or_else(|| {
            ImportError::InternalError("待删除的阶梯价缺少 record_id".to_string())
        })?;

        self.repo.delete(record_id)?;

        let key = natural_key(record);
        let index = self.ensure_index()?;
        if let Some(records) = index.get_mut(&key) {
            records.retain(|r| r.record_id != Some(record_id));
            if records.is_empty() {
                index.remove(&key);
            }
        }
        Ok(())
    }
}

fn primary(records: &[TierPriceRecord]) -> Option<&TierPriceRecord> {
    records.iter().min_by_key(|r| r.record_id)
}

fn parse_number(sku: &str, field: &str, value: &str) -> ImportResult<f64> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ImportError::InvalidNumber {
            sku: sku.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

// ==========================================
// 测试辅助: 内存持久化网关
// ==========================================
#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{RecordId, TierPriceRecord};
    use crate::importer::code_resolver::StoreCodeResolver;
    use crate::repository::{RepositoryError, RepositoryResult, TierPriceRepository};
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, HashMap};

    #[derive(Default)]
    pub struct InMemoryTierPriceRepository {
        pub records: RefCell<BTreeMap<i64, TierPriceRecord>>,
        pub next_id: Cell<i64>,
        pub fail_writes: Cell<bool>,
        pub find_all_calls: Cell<usize>,
    }

    impl InMemoryTierPriceRepository {
        pub fn with_records(records: Vec<TierPriceRecord>) -> Self {
            let repo = Self::default();
            for record in records {
                repo.insert(record);
            }
            repo
        }

        pub fn insert(&self, record: TierPriceRecord) -> RecordId {
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            self.records
                .borrow_mut()
                .insert(id, record.with_record_id(RecordId(id)));
            RecordId(id)
        }

        pub fn get(&self, id: RecordId) -> Option<TierPriceRecord> {
            self.records.borrow().get(&id.0).cloned()
        }

        pub fn len(&self) -> usize {
            self.records.borrow().len()
        }

        fn check_writable(&self) -> RepositoryResult<()> {
            if self.fail_writes.get() {
                return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()));
            }
            Ok(())
        }
    }

    impl TierPriceRepository for InMemoryTierPriceRepository {
        fn find_all(&self) -> RepositoryResult<Vec<TierPriceRecord>> {
            self.find_all_calls.set(self.find_all_calls.get() + 1);
            Ok(self.records.borrow().values().cloned().collect())
        }

        fn create(&self, record: &TierPriceRecord) -> RepositoryResult<RecordId> {
            self.check_writable()?;
            Ok(self.insert(record.clone()))
        }

        fn update(&self, record: &TierPriceRecord, record_id: RecordId) -> RepositoryResult<()> {
            self.check_writable()?;
            let mut records = self.records.borrow_mut();
            match records.get_mut(&record_id.0) {
                Some(existing) => {
                    *existing = record.clone().with_record_id(record_id);
                    Ok(())
                }
                None => Err(RepositoryError::NotFound {
                    entity: "tier_price".to_string(),
                    id: record_id.to_string(),
                }),
            }
        }

        fn delete(&self, record_id: RecordId) -> RepositoryResult<()> {
            self.check_writable()?;
            match self.records.borrow_mut().remove(&record_id.0) {
                Some(_) => Ok(()),
                None => Err(RepositoryError::NotFound {
                    entity: "tier_price".to_string(),
                    id: record_id.to_string(),
                }),
            }
        }
    }

    /// 网站: base=1, b2b=2；客户组: General=1, Wholesale=2
    pub fn resolver() -> StoreCodeResolver {
        StoreCodeResolver::new(
            HashMap::from([("base".to_string(), 1), ("b2b".to_string(), 2)]),
            HashMap::from([("General".to_string(), 1), ("Wholesale".to_string(), 2)]),
            HashMap::new(),
            HashMap::new(),
        )
    }
}
