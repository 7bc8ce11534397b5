// ==========================================
// 产品阶梯价导入 - 产物导出
// ==========================================
// 输出: <dir>/tier-price-import_<时间戳>_01.csv
// 列: sku, tier_price_qty, tier_price, tier_price_value_type,
//     tier_price_website, tier_price_customer_group（可直接作为导入文件回灌）
// ==========================================

use crate::domain::{column_keys, TierPriceArtefact};
use crate::importer::error::{ImportError, ImportResult};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub const ARTEFACT_FILE_PREFIX: &str = "tier-price-import";

pub struct ArtefactExporter {
    export_dir: PathBuf,
}

impl ArtefactExporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// 产物文件路径（同一批次只有一个分片，固定 _01）
    pub fn artefact_path(&self, timestamp: DateTime<Utc>) -> PathBuf {
        self.export_dir.join(format!(
            "{}_{}_01.csv",
            ARTEFACT_FILE_PREFIX,
            timestamp.format("%Y%m%d-%H%M%S")
        ))
    }

    /// 写出产物，返回文件路径
    pub fn export(
        &self,
        artefacts: &[TierPriceArtefact],
        timestamp: DateTime<Utc>,
    ) -> ImportResult<PathBuf> {
        std::fs::create_dir_all(&self.export_dir).map_err(|e| {
            ImportError::ArtefactExportError(format!("{}: {}", self.export_dir.display(), e))
        })?;

        let path = self.artefact_path(timestamp);
        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| ImportError::ArtefactExportError(e.to_string()))?;

        writer
            .write_record(column_keys::ARTEFACT_HEADERS)
            .map_err(|e| ImportError::ArtefactExportError(e.to_string()))?;
        for artefact in artefacts {
            writer
                .write_record(artefact.to_record())
                .map_err(|e| ImportError::ArtefactExportError(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| ImportError::ArtefactExportError(e.to_string()))?;

        tracing::info!(
            path = %path.display(),
            artefacts = artefacts.len(),
            "阶梯价产物已导出"
        );
        Ok(path)
    }
}
