// ==========================================
// 配置集成测试
// ==========================================
// 测试目标: ConfigManager 文件加载、ImportSettings 快照、配置驱动编排器
// ==========================================

mod test_helpers;

use enerjios_import::config::{config_keys, ConfigManager, ImportConfigReader, ImportSettings};
use enerjios_import::domain::schema::product_fields;
use enerjios_import::{ImportError, ImportOrchestrator};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::{product_workbook, MockConfig, MockSink};

#[tokio::test]
async fn test_settings_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"max_file_size_bytes": 2048, "auto_map_threshold": 0.9, "import_timeout_secs": 12, "auto_exclude_empty_rows": false, "locale": "en"}}"#
    )
    .unwrap();

    let config = ConfigManager::from_path(file.path()).unwrap();
    let settings = ImportSettings::load(&config).await.unwrap();

    assert_eq!(settings.max_file_size_bytes, 2048);
    assert_eq!(settings.auto_map_threshold, 0.9);
    assert_eq!(settings.import_timeout, Duration::from_secs(12));
    assert!(!settings.auto_exclude_empty_rows);
    assert_eq!(settings.locale, "en");
}

#[tokio::test]
async fn test_invalid_value_surfaces_key() {
    let config = ConfigManager::new();
    config
        .set_config_value(config_keys::MAX_FILE_SIZE_BYTES, "on megabayt")
        .unwrap();

    let err = ImportSettings::load(&config).await.unwrap_err();

    assert!(matches!(err, ImportError::ConfigValueError { ref key, .. } if key == "max_file_size_bytes"));
}

#[tokio::test]
async fn test_mock_config_drives_orchestrator() {
    let config = MockConfig::default();
    assert_eq!(config.get_auto_map_threshold().await.unwrap(), 0.85);
    let settings = ImportSettings::load(&config).await.unwrap();
    let mut orch = ImportOrchestrator::new(product_fields(), Arc::new(MockSink::new()), settings);

    orch.upload("urunler.xlsx", product_workbook()).await.unwrap();

    // auto_exclude_empty_rows = false: 空行保留在范围内
    assert!(orch.active_sheet().unwrap().excluded_rows.is_empty());
}
