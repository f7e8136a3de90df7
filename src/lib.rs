// src/lib.rs

//! Tamper-evident license timestamps.
//!
//! A license is stamped with the local time it was issued. The timestamp text
//! is encoded symbol by symbol with rotating keys and written next to a
//! checksum file; later checks decode it, verify the checksum, and decide
//! whether the license duration has run out.

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod ffi;
pub mod storage;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use api::{IssuedTimestamp, LicenseRecord, LicenseTimestamp, LicenseVerdict};
pub use config::Config;
pub use error::{LicenseError, Result};
pub use types::{CipherScheme, LogLevel, OperationState, StorageType};

/// Loads the configuration and installs the logger.
///
/// Without a path the built-in defaults are used, still subject to
/// `LICENSE_TS_` environment overrides. With the `logging` feature an
/// `env_logger` is installed at the configured level; this fails with
/// `InvalidParameter` if a logger is already installed.
pub fn init(config_path: Option<&str>) -> Result<Config> {
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => {
            let mut config = Config::default();
            config.apply_env_vars()?;
            config.validate()?;
            config
        }
    };

    #[cfg(feature = "logging")]
    {
        env_logger::Builder::new()
            .filter_level(config.logging.level.to_level_filter())
            .try_init()
            .map_err(|e| {
                LicenseError::invalid_parameter(format!("Logger already initialized: {}", e))
            })?;
    }

    log::debug!("Configuration loaded: {:?}", config);
    Ok(config)
}
