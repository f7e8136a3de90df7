use license_timestamp::config::Config;
use license_timestamp::{init, LicenseError, StorageType};
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

#[test]
#[serial]
fn test_init_fails_when_logger_already_set() {
    // Pre-initialize logger
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("cfg.toml");
    let mut cfg = Config::default();
    cfg.storage.storage_type = StorageType::Memory;
    fs::write(&config_path, toml::to_string(&cfg).unwrap()).unwrap();

    let result = init(Some(config_path.to_str().unwrap()));
    assert!(matches!(result, Err(LicenseError::InvalidParameter(_))));
}

#[test]
#[serial]
fn test_init_reports_bad_config_before_logging() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("cfg.toml");
    fs::write(&config_path, "[license]\nduration_days = -3.0\n").unwrap();

    let result = init(Some(config_path.to_str().unwrap()));
    assert!(matches!(result, Err(LicenseError::Config(_))));
}
