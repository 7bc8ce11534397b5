// ==========================================
// 端到端集成测试 - 阶梯价导入完整流程
// ==========================================
// 测试目标: 验证从 CSV 导入到对账、过期清理的完整流程
// 覆盖范围: CsvParser + DirectReconciler / ArtefactExportReconciler + SQLite 仓储
// ==========================================


use std::path::Path;
use test_helpers::*;
use tier_price_import::config::{config_keys, ConfigManager, TierPriceConfigReader};
use tier_price_import::{
    ImportError, ImportMode, PrimaryKeyMember, RunReport, TierPriceImportConfig, TierPriceImporter,
};

// ==========================================
// 测试辅助函数
// ==========================================

fn load_config(db_path: &str) -> TierPriceImportConfig {
    let conn = open_shared(db_path).unwrap();
    ConfigManager::from_connection(conn).load_import_config().unwrap()
}

fn import_with(
    db_path: &str,
    config: &TierPriceImportConfig,
    file: &Path,
) -> Result<RunReport, ImportError> {
    let conn = open_shared(db_path).unwrap();
    let mut importer = TierPriceImporter::from_config(config, conn)?;
    importer.import_file(file)
}

fn import(db_path: &str, file: &Path) -> Result<RunReport, ImportError> {
    import_with(db_path, &load_config(db_path), file)
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_import_creates_then_reimport_is_idempotent() {
    tier_price_import::logging::init_test();
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &[
            "sku,store_view_code,tier_prices",
            "SKU-A,,\"qty=5,price=10|qty=10,price=9,customer_group=General\"",
            "SKU-B,admin,\"qty=1,price=20,value_type=Discount,website=b2b\"",
        ],
    )
    .unwrap();

    let first = import(&db_path, &file).unwrap();
    assert_eq!(first.mode, ImportMode::Direct);
    assert_eq!(first.stats.rows_processed, 2);
    assert_eq!(first.stats.created, 3);
    assert!(first.swept);

    let second = import(&db_path, &file).unwrap();
    assert_eq!(second.stats.created, 0);
    assert_eq!(second.stats.updated, 0);
    assert_eq!(second.stats.unchanged, 3);
    assert_eq!(second.stats.deleted_obsolete, 0);

    let rows = load_tier_prices(&db_path, "entity_id").unwrap();
    assert_eq!(rows.len(), 3);

    // 折扣价写入 percentage_value
    let discount = rows.iter().find(|r| r.1 == 2).unwrap();
    assert_eq!(discount.4, Some(20.0));
    assert_eq!(discount.5, 2);

    // 指定客户组时 all_groups = false
    let grouped = rows.iter().find(|r| r.1 == 1 && r.2 == 10.0).unwrap();
    assert_eq!(grouped.6, 1);
    assert!(!grouped.7);
}

#[test]
fn test_reimport_updates_price_in_place() {
    let (_db, db_path) = create_test_db().unwrap();
    let value_id = insert_tier_price(&db_path, 1, 10.0, 9.99, 0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &["sku,tier_prices", "SKU-A,\"qty=10,price=8.99\""],
    )
    .unwrap();

    let report = import(&db_path, &file).unwrap();
    assert_eq!(report.stats.updated, 1);
    assert_eq!(report.stats.created, 0);

    let rows = load_tier_prices(&db_path, "entity_id").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, value_id);
    assert_eq!(rows[0].3, 8.99);
}

#[test]
fn test_fewer_entries_deletes_obsolete_and_keeps_untouched() {
    let (_db, db_path) = create_test_db().unwrap();
    insert_tier_price(&db_path, 1, 5.0, 10.0, 0).unwrap();
    insert_tier_price(&db_path, 1, 10.0, 9.0, 0).unwrap();
    insert_tier_price(&db_path, 3, 1.0, 50.0, 0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &["sku,tier_prices", "SKU-A,\"qty=5,price=10\""],
    )
    .unwrap();

    let report = import(&db_path, &file).unwrap();
    assert_eq!(report.stats.unchanged, 1);
    assert_eq!(report.stats.deleted_obsolete, 1);
    assert_eq!(report.touched_parents, 1);

    assert_eq!(count_tier_prices(&db_path, 1).unwrap(), 1);
    // SKU-C 未出现在本批次，保留
    assert_eq!(count_tier_prices(&db_path, 3).unwrap(), 1);
}

#[test]
fn test_empty_tier_prices_cell_clears_product() {
    let (_db, db_path) = create_test_db().unwrap();
    insert_tier_price(&db_path, 2, 5.0, 10.0, 0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(dir.path(), "products.csv", &["sku,tier_prices", "SKU-B,"]).unwrap();

    let report = import(&db_path, &file).unwrap();
    assert_eq!(report.stats.deleted_obsolete, 1);
    assert_eq!(count_tier_prices(&db_path, 2).unwrap(), 0);
}

#[test]
fn test_clean_up_disabled_keeps_obsolete() {
    let (_db, db_path) = create_test_db().unwrap();
    insert_tier_price(&db_path, 1, 99.0, 1.0, 0).unwrap();
    set_config(&db_path, config_keys::CLEAN_UP_TIER_PRICES, "false").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &["sku,tier_prices", "SKU-A,\"qty=5,price=10\""],
    )
    .unwrap();

    let report = import(&db_path, &file).unwrap();
    assert!(!report.swept);
    assert_eq!(count_tier_prices(&db_path, 1).unwrap(), 2);
}

#[test]
fn test_missing_field_aborts_without_debug_mode() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &[
            "sku,tier_prices",
            "SKU-A,\"qty=5,price=10\"",
            "SKU-B,\"price=3\"",
            "SKU-C,\"qty=1,price=2\"",
        ],
    )
    .unwrap();

    let err = import(&db_path, &file).unwrap_err();
    assert!(matches!(err, ImportError::MissingField { ref field, .. } if field == "qty"));

    // 已写入的记录不回滚，后续行未处理
    assert_eq!(count_tier_prices(&db_path, 1).unwrap(), 1);
    assert_eq!(count_tier_prices(&db_path, 3).unwrap(), 0);
}

#[test]
fn test_debug_mode_skips_bad_rows() {
    let (_db, db_path) = create_test_db().unwrap();
    set_config(&db_path, config_keys::DEBUG_MODE, "true").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &[
            "sku,tier_prices",
            "SKU-A,\"qty=5,price=10\"",
            "SKU-B,\"price=3\"",
            "SKU-X,\"qty=1,price=2\"",
            "SKU-C,\"qty=1,price=2,customer_group=VIP\"",
            "SKU-C,\"qty=2,price=abc\"",
            "SKU-C,\"qty=1,price=2,value_type=Percent\"",
            "SKU-C,\"qty=1,price=2\"",
        ],
    )
    .unwrap();

    let report = import(&db_path, &file).unwrap();
    assert_eq!(report.stats.rows_processed, 7);
    assert_eq!(report.stats.rows_skipped, 5);
    assert_eq!(report.stats.created, 2);
    assert_eq!(count_tier_prices(&db_path, 3).unwrap(), 1);
}

#[test]
fn test_debug_mode_partially_bad_row_keeps_stored_prices() {
    let (_db, db_path) = create_test_db().unwrap();
    set_config(&db_path, config_keys::DEBUG_MODE, "true").unwrap();
    for qty in [5.0, 10.0, 20.0] {
        insert_tier_price(&db_path, 1, qty, 1.0, 0).unwrap();
    }
    let dir = tempfile::tempdir().unwrap();

    // 第二个条目的客户组未知 / 第二个条目缺 qty，两种失败结果一致
    for cell in [
        "\"qty=5,price=2|qty=10,price=1,customer_group=VIP|qty=20,price=1\"",
        "\"qty=5,price=2|price=1|qty=20,price=1\"",
    ] {
        let sku_a_line = format!("SKU-A,{}", cell);
        let file = write_csv(
            dir.path(),
            "products.csv",
            &["sku,tier_prices", sku_a_line.as_str(), "SKU-C,\"qty=1,price=2\""],
        )
        .unwrap();

        let report = import(&db_path, &file).unwrap();
        assert_eq!(report.stats.rows_processed, 2);
        assert_eq!(report.stats.rows_skipped, 1);
        assert_eq!(report.stats.created + report.stats.unchanged, 1);
        assert_eq!(report.stats.updated, 0);
        assert_eq!(report.stats.deleted_obsolete, 0);

        let rows = load_tier_prices(&db_path, "entity_id").unwrap();
        let sku_a: Vec<(f64, f64)> = rows
            .iter()
            .filter(|r| r.1 == 1)
            .map(|r| (r.2, r.3))
            .collect();
        assert_eq!(sku_a, vec![(5.0, 1.0), (10.0, 1.0), (20.0, 1.0)]);
        assert_eq!(count_tier_prices(&db_path, 3).unwrap(), 1);
    }
}

#[test]
fn test_partially_bad_row_aborts_before_writing_without_debug_mode() {
    let (_db, db_path) = create_test_db().unwrap();
    for qty in [5.0, 10.0] {
        insert_tier_price(&db_path, 1, qty, 1.0, 0).unwrap();
    }
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &[
            "sku,tier_prices",
            "SKU-C,\"qty=1,price=2\"",
            "SKU-A,\"qty=5,price=2|qty=30,price=1|qty=10,price=abc\"",
        ],
    )
    .unwrap();

    let err = import(&db_path, &file).unwrap_err();
    assert!(matches!(err, ImportError::InvalidNumber { ref field, .. } if field == "price"));

    // 前一行已写入；出错行的条目一条都未写入
    assert_eq!(count_tier_prices(&db_path, 3).unwrap(), 1);
    let rows = load_tier_prices(&db_path, "entity_id").unwrap();
    let sku_a: Vec<(f64, f64)> = rows
        .iter()
        .filter(|r| r.1 == 1)
        .map(|r| (r.2, r.3))
        .collect();
    assert_eq!(sku_a, vec![(5.0, 1.0), (10.0, 1.0)]);
}

#[test]
fn test_stored_prices_sharing_a_key_are_collapsed() {
    let (_db, db_path) = create_test_db().unwrap();
    insert_tier_price(&db_path, 1, 10.00001, 1.0, 0).unwrap();
    insert_tier_price(&db_path, 1, 10.00002, 1.0, 0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &["sku,tier_prices", "SKU-A,\"qty=10,price=1\""],
    )
    .unwrap();

    let report = import(&db_path, &file).unwrap();
    assert_eq!(report.stats.updated, 1);
    assert_eq!(report.stats.deleted_obsolete, 1);

    let rows = load_tier_prices(&db_path, "entity_id").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, 1);
    assert_eq!(rows[0].2, 10.0);
}

#[test]
fn test_unassigned_website_entry_is_skipped() {
    let (_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &["sku,tier_prices", "SKU-A,\"qty=5,price=10,website=b2b|qty=5,price=11,website=base\""],
    )
    .unwrap();

    let report = import(&db_path, &file).unwrap();
    assert_eq!(report.stats.entries_skipped, 1);
    assert_eq!(report.stats.created, 1);

    let rows = load_tier_prices(&db_path, "entity_id").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].5, 1);
}

#[test]
fn test_code_aliases_from_config() {
    let (_db, db_path) = create_test_db().unwrap();
    set_config(
        &db_path,
        config_keys::CUSTOMER_GROUP_CODE_MAPPINGS,
        r#"{"Trade": "Wholesale"}"#,
    )
    .unwrap();
    set_config(&db_path, config_keys::WEBSITE_CODE_MAPPINGS, r#"{"main": "base"}"#).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &["sku,tier_prices", "SKU-A,\"qty=5,price=10,website=main,customer_group=Trade\""],
    )
    .unwrap();

    import(&db_path, &file).unwrap();

    let rows = load_tier_prices(&db_path, "entity_id").unwrap();
    assert_eq!(rows[0].5, 1);
    assert_eq!(rows[0].6, 2);
}

#[test]
fn test_non_admin_store_view_rows_are_ignored() {
    let (_db, db_path) = create_test_db().unwrap();
    insert_tier_price(&db_path, 1, 5.0, 10.0, 0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &["sku,store_view_code,tier_prices", "SKU-A,default,\"qty=1,price=1\""],
    )
    .unwrap();

    let report = import(&db_path, &file).unwrap();
    assert_eq!(report.stats.created, 0);
    assert_eq!(report.touched_parents, 0);
    assert_eq!(count_tier_prices(&db_path, 1).unwrap(), 1);
}

#[test]
fn test_delete_operation_removes_matching_tier_price() {
    let (_db, db_path) = create_test_db().unwrap();
    insert_tier_price(&db_path, 1, 5.0, 10.0, 0).unwrap();
    insert_tier_price(&db_path, 1, 10.0, 9.0, 0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &["sku,operation,tier_prices", "SKU-A,delete,\"qty=10,price=9\""],
    )
    .unwrap();

    let report = import(&db_path, &file).unwrap();
    assert_eq!(report.stats.cleared, 1);
    assert_eq!(report.stats.deleted_obsolete, 0);
    assert_eq!(count_tier_prices(&db_path, 1).unwrap(), 1);
}

#[test]
fn test_row_id_primary_key_member() {
    let (_db, db_path) = create_test_db_with(PrimaryKeyMember::RowId).unwrap();
    set_config(&db_path, config_keys::PRIMARY_KEY_MEMBER, "row_id").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "products.csv",
        &["sku,tier_prices", "SKU-B,\"qty=3,price=7\""],
    )
    .unwrap();

    let report = import(&db_path, &file).unwrap();
    assert_eq!(report.stats.created, 1);

    let rows = load_tier_prices(&db_path, "row_id").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1, 102);
}

#[test]
fn test_artefact_export_then_direct_pass() {
    let (_db, db_path) = create_test_db().unwrap();
    insert_tier_price(&db_path, 1, 99.0, 1.0, 0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let export_dir = dir.path().join("export");
    let file = write_csv(
        dir.path(),
        "products.csv",
        &[
            "sku,tier_prices",
            "SKU-A,\"qty=5,price=10|qty=10,price=9\"",
            "SKU-B,\"qty=1,price=3,website=b2b\"",
        ],
    )
    .unwrap();

    // 第一遍: 仅导出产物，不写库
    let mut config = load_config(&db_path);
    config.import_mode = ImportMode::ArtefactExport;
    config.artefact_export_dir = export_dir.clone();
    let export = import_with(&db_path, &config, &file).unwrap();

    assert_eq!(export.mode, ImportMode::ArtefactExport);
    assert_eq!(export.stats.artefacts_exported, 3);
    let artefact_file = export.export_file.unwrap();
    assert!(artefact_file.starts_with(&export_dir));
    let name = artefact_file.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("tier-price-import_") && name.ends_with("_01.csv"));
    assert_eq!(count_tier_prices(&db_path, 1).unwrap(), 1);

    // 第二遍: 直接模式回灌产物文件
    let report = import(&db_path, &artefact_file).unwrap();
    assert_eq!(report.stats.created, 3);
    assert_eq!(report.stats.deleted_obsolete, 1);
    assert_eq!(count_tier_prices(&db_path, 1).unwrap(), 2);
    assert_eq!(count_tier_prices(&db_path, 2).unwrap(), 1);
}
