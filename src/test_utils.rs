// src/test_utils.rs

#![cfg(test)] // Ensure this module is only compiled for tests

use crate::config::Config;
use crate::StorageType;
use std::sync::OnceLock;

/// Provides a common test configuration.
/// Uses in-memory storage, a 0.1 day license, and no diagnostics.
pub fn get_test_config() -> &'static Config {
    static TEST_CONFIG: OnceLock<Config> = OnceLock::new();
    TEST_CONFIG.get_or_init(|| {
        let mut config = Config::default();
        config.storage.storage_type = StorageType::Memory;
        config.license.duration_days = 0.1;
        config.logging.diagnostics = false;
        config
    })
}
