//! Configuration management for the license timestamp system
//!
//! This module handles loading, validating, and providing access to the
//! application configuration. It supports loading configuration from a TOML
//! file, environment variables, and programmatic overrides.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod validation;

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod validation_tests;

#[cfg(test)]
#[path = "tests/config_mod_tests.rs"]
mod config_mod_tests;

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};
use directories::ProjectDirs;

use serde::{Deserialize, Serialize};

use crate::api::sync_api::LicenseRecord;
use crate::core::cipher::CipherSettings;
use crate::core::checksum::DEFAULT_CHECKSUM_MODULUS;
use crate::core::timestamp::DEFAULT_BUFFER_SIZE;
use crate::types::{CipherScheme, LogLevel, StorageType};

/// Re-export the error type
pub use error::ConfigError;

/// The environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "LICENSE_TS_";

/// The application name used for finding config directories
const APP_NAME: &str = "license-timestamp";

/// Main configuration structure for the license timestamp system.
///
/// # Example
///
/// ```no_run
/// use license_timestamp::config::Config;
///
/// // A path that does not exist falls back to the defaults.
/// let config = Config::load("path/that/hopefully/does/not/exist.toml").unwrap();
/// assert_eq!(config.cipher.checksum_modulus, 3001);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Timestamp file locations and license duration
    #[serde(default)]
    pub license: LicenseConfig,

    /// Cipher and checksum parameters
    #[serde(default)]
    pub cipher: CipherConfig,

    /// Persistence backend selection
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the timestamp pair lives and how long the license lasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    /// Path of the encoded timestamp file
    pub encrypted_file: String,
    /// Path of the checksum file
    pub checksum_file: String,
    /// License duration in days; fractions are allowed
    pub duration_days: f64,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            encrypted_file: "Encrypted.txt".to_string(),
            checksum_file: "checksum.txt".to_string(),
            duration_days: 0.1,
        }
    }
}

impl LicenseConfig {
    /// The construction parameters for a [`crate::LicenseTimestamp`].
    pub fn record(&self) -> LicenseRecord {
        LicenseRecord::new(&self.encrypted_file, &self.checksum_file, self.duration_days)
    }
}

/// Cipher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// Transform variant
    pub scheme: CipherScheme,
    /// Upper bound (exclusive) of each checksum digit
    pub checksum_modulus: u64,
    /// Symbol slots available to one timestamp; the text must be shorter
    pub buffer_size: usize,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            scheme: CipherScheme::Modular,
            checksum_modulus: DEFAULT_CHECKSUM_MODULUS,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl CipherConfig {
    /// Runtime settings for the cipher, checksum, and timestamp codecs.
    pub fn settings(&self) -> CipherSettings {
        CipherSettings {
            scheme: self.scheme,
            checksum_modulus: self.checksum_modulus,
            buffer_size: self.buffer_size,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type
    #[serde(rename = "type")]
    pub storage_type: StorageType,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Whether encode/decode diagnostics are forwarded to the logger
    pub diagnostics: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            diagnostics: true,
        }
    }
}

impl Config {
    /// Loads the configuration from the specified path.
    ///
    /// A missing file falls back to the built-in defaults. In both cases
    /// environment variables with the `LICENSE_TS_` prefix are applied on top
    /// and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, if an
    /// environment override is malformed, or if validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = match fs::read_to_string(path) {
            Ok(config_str) => toml::from_str::<Config>(&config_str)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Config file not found at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::error!("Failed to read config file {}: {}", path.display(), e);
                return Err(ConfigError::Io(e));
            }
        };

        config.apply_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// Recognised keys (after the `LICENSE_TS_` prefix): `LOGGING_LEVEL`,
    /// `LICENSE_DURATION_DAYS`, `LICENSE_ENCRYPTED_FILE`,
    /// `LICENSE_CHECKSUM_FILE`, `CIPHER_SCHEME`.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable cannot be parsed.
    pub fn apply_env_vars(&mut self) -> Result<(), ConfigError> {
        for (key, value) in env::vars() {
            let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }

            match stripped.to_lowercase().as_str() {
                "logging_level" => {
                    self.logging.level = value.parse().map_err(|_| {
                        ConfigError::invalid_value("logging.level", &value, "Invalid log level")
                    })?;
                }
                "license_duration_days" => {
                    self.license.duration_days = value.trim().parse().map_err(|_| {
                        ConfigError::invalid_value(
                            "license.duration_days",
                            &value,
                            "Duration must be a number of days",
                        )
                    })?;
                }
                "license_encrypted_file" => self.license.encrypted_file = value,
                "license_checksum_file" => self.license.checksum_file = value,
                "cipher_scheme" => {
                    self.cipher.scheme = value.parse().map_err(|_| {
                        ConfigError::invalid_value("cipher.scheme", &value, "Expected 'modular' or 'legacy'")
                    })?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match validation::validate_config(self) {
            Ok(()) => Ok(()),
            Err(crate::error::LicenseError::Config(config_error)) => Err(config_error),
            Err(other) => Err(ConfigError::Other(other.to_string())),
        }
    }

    /// Returns the directory where configuration files should be stored.
    ///
    /// This is OS-specific, e.g. `$HOME/.config/license-timestamp` on Linux.
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("org", "licensetimestamp", APP_NAME)
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.license.encrypted_file, "Encrypted.txt");
        assert_eq!(config.license.checksum_file, "checksum.txt");
        assert_eq!(config.cipher.buffer_size, 21);
        assert_eq!(config.cipher.scheme, CipherScheme::Modular);
        assert!(config.logging.diagnostics);
    }
}
