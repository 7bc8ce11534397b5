// ==========================================
// 产品阶梯价导入 - 命令行入口
// ==========================================
// 用法:
//   tier-price-import --db catalog.db --file products.csv [--mode artefact-export] [--json]
// 配置: config_kv（global scope），命令行参数覆写
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tier_price_import::config::{ConfigManager, TierPriceConfigReader};
use tier_price_import::db::{init_schema, open_sqlite_connection, read_schema_version};
use tier_price_import::{logging, ImportMode, PrimaryKeyMember, RunReport, TierPriceImporter};

/// Import product tier prices from a CSV file and reconcile them with the catalog database.
#[derive(Parser, Debug)]
#[command(name = "tier-price-import", version, about = "产品阶梯价导入")]
struct Cli {
    /// SQLite 数据库路径
    #[arg(long)]
    db: PathBuf,

    /// 导入文件（.csv）
    #[arg(long)]
    file: PathBuf,

    /// 导入模式（direct / artefact-export），覆盖 import-mode 配置
    #[arg(long)]
    mode: Option<String>,

    /// 调试模式：行级错误只告警并跳过
    #[arg(long)]
    debug: bool,

    /// 不清理过期阶梯价
    #[arg(long)]
    no_clean_up: bool,

    /// 产物导出目录，覆盖 artefact-export-dir 配置
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// 产品主键列（entity_id / row_id），覆盖 primary-key-member 配置
    #[arg(long)]
    primary_key_member: Option<String>,

    /// 导入前初始化 schema
    #[arg(long)]
    init_schema: bool,

    /// 以 JSON 输出批次报告
    #[arg(long)]
    json: bool,
}

fn parse_primary_key_member(value: &str) -> Result<PrimaryKeyMember> {
    PrimaryKeyMember::from_code(value)
        .with_context(|| format!("无效的主键列: {} (entity_id / row_id)", value))
}

fn print_report(report: &RunReport) {
    println!("批次: {} ({})", report.serial, report.mode.as_str());
    println!("处理行数: {}，跳过: {}", report.stats.rows_processed, report.stats.rows_skipped);
    println!(
        "新建: {}，更新: {}，无变化: {}，跳过条目: {}",
        report.stats.created, report.stats.updated, report.stats.unchanged, report.stats.entries_skipped
    );
    println!(
        "删除: {}，过期清理: {}",
        report.stats.cleared, report.stats.deleted_obsolete
    );
    if let Some(path) = &report.export_file {
        println!(
            "产物: {} ({} 条)",
            path.display(),
            report.stats.artefacts_exported
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    tracing::info!("产品阶梯价导入 v{}", tier_price_import::VERSION);

    let db_path = cli.db.to_string_lossy().to_string();
    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库 {}", db_path))?;

    let pk_override = cli
        .primary_key_member
        .as_deref()
        .map(parse_primary_key_member)
        .transpose()?;

    if cli.init_schema {
        init_schema(&conn, pk_override.unwrap_or_default()).context("初始化 schema 失败")?;
    }
    let schema_version = read_schema_version(&conn)?;
    tracing::debug!(?schema_version, "数据库 schema 版本");

    let conn = Arc::new(Mutex::new(conn));
    let mut config = ConfigManager::from_connection(conn.clone())
        .load_import_config()
        .context("读取导入配置失败")?;

    // 命令行覆写
    if let Some(mode) = cli.mode.as_deref() {
        config.import_mode = ImportMode::from_code(mode)
            .with_context(|| format!("无效的导入模式: {} (direct / artefact-export)", mode))?;
    }
    if let Some(pk) = pk_override {
        config.primary_key_member = pk;
    }
    if cli.debug {
        config.debug_mode = true;
    }
    if cli.no_clean_up {
        config.clean_up_tier_prices = false;
    }
    if let Some(dir) = cli.export_dir {
        config.artefact_export_dir = dir;
    }

    let mut importer = TierPriceImporter::from_config(&config, conn)?;
    let report = importer
        .import_file(&cli.file)
        .with_context(|| format!("导入失败: {}", cli.file.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}
