// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证导入配置读取功能的正确性
// ==========================================


use std::path::PathBuf;
use test_helpers::{create_test_db, set_config};
use tier_price_import::config::{config_keys, ConfigManager, TierPriceConfigReader};
use tier_price_import::{ImportError, ImportMode, PrimaryKeyMember, TierPriceImportConfig};

#[test]
fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[test]
fn test_defaults_without_config_rows() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    let config = config_manager.load_import_config().unwrap();
    assert_eq!(config, TierPriceImportConfig::default());
    assert!(config.clean_up_tier_prices);
    assert!(!config.debug_mode);
    assert!(config.check_website_assignment);
    assert_eq!(config.field_delimiter, ',');
}

#[test]
fn test_full_config_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    set_config(&db_path, config_keys::CLEAN_UP_TIER_PRICES, "no").unwrap();
    set_config(&db_path, config_keys::DEBUG_MODE, "on").unwrap();
    set_config(&db_path, config_keys::CHECK_WEBSITE_ASSIGNMENT, "0").unwrap();
    set_config(&db_path, config_keys::WEBSITE_CODE_MAPPINGS, r#"{"main":"base"}"#).unwrap();
    set_config(&db_path, config_keys::PRIMARY_KEY_MEMBER, "row_id").unwrap();
    set_config(&db_path, config_keys::IMPORT_MODE, "artefact_export").unwrap();
    set_config(&db_path, config_keys::MULTIPLE_FIELD_DELIMITER, " ").unwrap();
    set_config(&db_path, config_keys::ARTEFACT_EXPORT_DIR, "/var/import").unwrap();

    let config = ConfigManager::new(&db_path)
        .unwrap()
        .load_import_config()
        .unwrap();

    assert!(!config.clean_up_tier_prices);
    assert!(config.debug_mode);
    assert!(!config.check_website_assignment);
    assert_eq!(config.website_code_mappings.get("main"), Some(&"base".to_string()));
    assert_eq!(config.primary_key_member, PrimaryKeyMember::RowId);
    assert_eq!(config.import_mode, ImportMode::ArtefactExport);
    assert_eq!(config.field_delimiter, ' ');
    assert_eq!(config.artefact_export_dir, PathBuf::from("/var/import"));
}

#[test]
fn test_unknown_import_mode_is_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    set_config(&db_path, config_keys::IMPORT_MODE, "batch").unwrap();

    let err = ConfigManager::new(&db_path)
        .unwrap()
        .load_import_config()
        .unwrap_err();
    assert!(matches!(err, ImportError::ConfigValueError { ref key, .. } if key == "import-mode"));
}

#[test]
fn test_global_value_roundtrip() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    assert_eq!(
        config_manager.get_global_config_value(config_keys::DEBUG_MODE).unwrap(),
        None
    );
    config_manager
        .set_global_config_value(config_keys::DEBUG_MODE, "true")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::DEBUG_MODE, "false")
        .unwrap();
    assert!(!config_manager.is_debug_mode().unwrap());
}
