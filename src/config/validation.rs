//! Configuration validation
//!
//! Checks that every section holds values the license timestamp core can
//! work with before any file is touched.

use std::path::Path;

use super::error::ConfigError;
use super::{CipherConfig, Config, LicenseConfig, StorageConfig};
use crate::core::timestamp::TIMESTAMP_LEN;
use crate::error::LicenseError;
use crate::types::StorageType;

/// Validates the application configuration.
///
/// # Errors
///
/// Returns `LicenseError::Config` wrapping the first failed check.
pub fn validate_config(config: &Config) -> Result<(), LicenseError> {
    validate_license_config(&config.license, &config.storage)?;
    validate_cipher_config(&config.cipher)?;
    Ok(())
}

/// Validates file locations and the license duration.
fn validate_license_config(
    config: &LicenseConfig,
    storage: &StorageConfig,
) -> Result<(), LicenseError> {
    if !config.duration_days.is_finite() || config.duration_days < 0.0 {
        return Err(ConfigError::invalid_value(
            "license.duration_days",
            config.duration_days,
            "Duration must be a finite, non-negative number of days",
        )
        .into());
    }

    // Memory storage never touches the paths
    if storage.storage_type != StorageType::File {
        return Ok(());
    }

    for (field, value) in [
        ("license.encrypted_file", &config.encrypted_file),
        ("license.checksum_file", &config.checksum_file),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::invalid_value(field, "", "Path cannot be empty for file storage").into());
        }

        if let Some(parent) = Path::new(value).parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(ConfigError::invalid_value(
                    field,
                    value,
                    format!("Parent directory '{}' does not exist", parent.display()),
                )
                .into());
            }
        }
    }

    if config.encrypted_file == config.checksum_file {
        return Err(ConfigError::validation_error(format!(
            "license.encrypted_file and license.checksum_file must differ (both '{}')",
            config.encrypted_file
        ))
        .into());
    }

    Ok(())
}

/// Validates cipher parameters.
fn validate_cipher_config(config: &CipherConfig) -> Result<(), LicenseError> {
    if config.checksum_modulus < 2 {
        return Err(ConfigError::invalid_value(
            "cipher.checksum_modulus",
            config.checksum_modulus,
            "checksum_modulus must be at least 2",
        )
        .into());
    }

    if config.buffer_size <= TIMESTAMP_LEN {
        return Err(ConfigError::invalid_value(
            "cipher.buffer_size",
            config.buffer_size,
            format!("buffer_size must exceed the {}-character timestamp", TIMESTAMP_LEN),
        )
        .into());
    }

    Ok(())
}
