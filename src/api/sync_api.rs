// src/api/sync_api.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::config::Config;
use crate::core::cipher::CipherSettings;
use crate::core::clock::{Clock, SystemClock};
use crate::core::diagnostics::{DiagnosticSink, LogSink, SilentSink};
use crate::core::expiry::ExpiryEvaluator;
use crate::core::timestamp::{now_to_text, TimestampCodec};
use crate::error::{LicenseError, Result};
use crate::storage::{create_gateway, FileGateway, PersistenceGateway};
use crate::types::{OperationState, StorageType};

/// Where one license's timestamp pair lives and how long the license lasts.
#[derive(Debug, Clone, PartialEq)]
pub struct LicenseRecord {
    encrypted_file: PathBuf,
    checksum_file: PathBuf,
    duration_days: f64,
}

impl LicenseRecord {
    /// A record for the pair at `encrypted_file` and `checksum_file`.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        encrypted_file: P,
        checksum_file: Q,
        duration_days: f64,
    ) -> Self {
        Self {
            encrypted_file: encrypted_file.as_ref().to_path_buf(),
            checksum_file: checksum_file.as_ref().to_path_buf(),
            duration_days,
        }
    }

    /// Path of the encoded values file.
    pub fn encrypted_file(&self) -> &Path {
        &self.encrypted_file
    }

    /// Path of the checksum file.
    pub fn checksum_file(&self) -> &Path {
        &self.checksum_file
    }

    /// License duration in days.
    pub fn duration_days(&self) -> f64 {
        self.duration_days
    }

    /// Rejects empty paths and durations that are negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.encrypted_file.as_os_str().is_empty() {
            return Err(LicenseError::invalid_parameter("encrypted file path is empty"));
        }
        if self.checksum_file.as_os_str().is_empty() {
            return Err(LicenseError::invalid_parameter("checksum file path is empty"));
        }
        self.validate_duration()
    }

    fn validate_duration(&self) -> Result<()> {
        if !self.duration_days.is_finite() || self.duration_days < 0.0 {
            return Err(LicenseError::invalid_parameter(format!(
                "license duration must be a non-negative number of days, got {}",
                self.duration_days
            )));
        }
        Ok(())
    }
}

/// A freshly issued timestamp and what was written for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuedTimestamp {
    /// The plaintext timestamp.
    pub text: String,
    /// Encoded values as stored.
    pub values: Vec<f64>,
    /// Checksum digits, one per value.
    pub checksum_digits: Vec<i64>,
    /// Serialized checksum as stored.
    pub checksum: String,
}

/// Status and expiry decision from a single check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicenseVerdict {
    /// Outcome of reading and verifying the stored timestamp.
    pub state: OperationState,
    /// The decoded timestamp when it could be read.
    pub timestamp: Option<String>,
    /// Days elapsed since the timestamp, when computable.
    pub elapsed_days: Option<f64>,
    /// Whether the license counts as expired.
    pub expired: bool,
}

/// Issues, verifies, and checks the expiry of one license timestamp.
///
/// By default the pair is stored in the two files named by the
/// [`LicenseRecord`], time comes from the system clock, and diagnostics go to
/// the logger.
///
/// # Example
///
/// ```no_run
/// use license_timestamp::{LicenseRecord, LicenseTimestamp};
///
/// let license = LicenseTimestamp::new(LicenseRecord::new("Encrypted.txt", "checksum.txt", 0.1))?;
/// license.create_timestamp_file()?;
/// println!("issued at {}", license.inspect_timestamp()?);
/// println!("expired: {}", license.is_license_expired());
/// # Ok::<(), license_timestamp::LicenseError>(())
/// ```
pub struct LicenseTimestamp {
    record: LicenseRecord,
    codec: TimestampCodec,
    expiry: ExpiryEvaluator,
    gateway: Box<dyn PersistenceGateway>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for LicenseTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseTimestamp")
            .field("record", &self.record)
            .field("codec", &self.codec)
            .field("gateway", &self.gateway)
            .field("clock", &self.clock)
            .finish()
    }
}

impl LicenseTimestamp {
    /// File-backed instance with default cipher settings.
    ///
    /// Fails with `InvalidParameter` if the record is invalid.
    pub fn new(record: LicenseRecord) -> Result<Self> {
        record.validate()?;
        let gateway = FileGateway::new(record.encrypted_file(), record.checksum_file())?;
        let sink: Arc<dyn DiagnosticSink> = Arc::new(LogSink);
        Ok(Self {
            expiry: ExpiryEvaluator::new(record.duration_days()),
            codec: TimestampCodec::default().with_sink(sink.clone()),
            record,
            gateway: Box::new(gateway),
            clock: Arc::new(SystemClock),
            sink,
        })
    }

    /// Instance built from every section of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let sink: Arc<dyn DiagnosticSink> = if config.logging.diagnostics {
            Arc::new(LogSink)
        } else {
            Arc::new(SilentSink)
        };
        let record = config.license.record();
        match config.storage.storage_type {
            StorageType::File => record.validate()?,
            // Memory storage never touches the paths
            StorageType::Memory => record.validate_duration()?,
        }
        Ok(Self {
            expiry: ExpiryEvaluator::new(record.duration_days()),
            codec: TimestampCodec::new(config.cipher.settings()).with_sink(sink.clone()),
            record,
            gateway: create_gateway(config)?,
            clock: Arc::new(SystemClock),
            sink,
        })
    }

    /// Replaces the persistence backend.
    pub fn with_gateway(mut self, gateway: Box<dyn PersistenceGateway>) -> Self {
        self.gateway = gateway;
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the diagnostics sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.codec = self.codec.with_sink(sink.clone());
        self.sink = sink;
        self
    }

    /// Replaces the cipher settings.
    pub fn with_settings(mut self, settings: CipherSettings) -> Self {
        self.codec = TimestampCodec::new(settings).with_sink(self.sink.clone());
        self
    }

    pub fn record(&self) -> &LicenseRecord {
        &self.record
    }

    pub fn codec(&self) -> &TimestampCodec {
        &self.codec
    }

    pub fn gateway(&self) -> &dyn PersistenceGateway {
        self.gateway.as_ref()
    }

    /// Stamps the current time into a new timestamp pair.
    ///
    /// Fails with `FileExist` without touching anything if either half of the
    /// pair is already present.
    pub fn create_timestamp_file(&self) -> Result<IssuedTimestamp> {
        let presence = self.gateway.presence();
        if presence.any() {
            warn!(
                "Refusing to overwrite existing timestamp ({}: {}, {}: {})",
                self.record.encrypted_file().display(),
                presence.encrypted,
                self.record.checksum_file().display(),
                presence.checksum
            );
            return Err(LicenseError::file_exist(format!(
                "{} or {}",
                self.record.encrypted_file().display(),
                self.record.checksum_file().display()
            )));
        }

        let text = now_to_text(self.clock.as_ref())?;
        let encoded = self.codec.encode_text(&text)?;
        let checksum = encoded.checksum();
        self.gateway.write(&encoded.values, &checksum)?;
        info!("Issued license timestamp {}", text);

        Ok(IssuedTimestamp {
            text,
            values: encoded.values,
            checksum_digits: encoded.checksum_digits,
            checksum,
        })
    }

    /// Reads, verifies, and decodes the stored timestamp.
    pub fn inspect_timestamp(&self) -> Result<String> {
        let stored = self.gateway.read()?;
        if stored.values.len() >= self.codec.buffer_size() {
            warn!(
                "Encrypted file holds {} values, more than a timestamp can have",
                stored.values.len()
            );
            return Err(LicenseError::tampered(format!(
                "{} encoded values exceed the {} symbol slots",
                stored.values.len(),
                self.codec.buffer_size()
            )));
        }
        if !self.codec.verify(&stored.values, &stored.checksum) {
            warn!("Mismatched checksum. The license file has been tampered with.");
            return Err(LicenseError::tampered("checksum does not match encoded values"));
        }
        self.codec.decode_sequence(&stored.values)
    }

    /// Whether the license is expired; any failure counts as expired.
    pub fn is_license_expired(&self) -> bool {
        self.evaluate().expired
    }

    /// Inspects the timestamp and decides expiry in one pass.
    pub fn evaluate(&self) -> LicenseVerdict {
        let text = match self.inspect_timestamp() {
            Ok(text) => text,
            Err(e) => {
                warn!("License timestamp check failed: {}", e);
                return LicenseVerdict {
                    state: e.state(),
                    timestamp: None,
                    elapsed_days: None,
                    expired: true,
                };
            }
        };

        let now = match self.clock.now() {
            Ok(now) => now,
            Err(e) => {
                warn!("Failed to read the system time: {}", e);
                return LicenseVerdict {
                    state: OperationState::TimestampRetrievalError,
                    timestamp: Some(text),
                    elapsed_days: None,
                    expired: true,
                };
            }
        };

        let verdict = self.expiry.evaluate(&text, &now);
        LicenseVerdict {
            state: OperationState::Success,
            timestamp: Some(text),
            elapsed_days: verdict.elapsed_days,
            expired: verdict.expired,
        }
    }

    /// Deletes both halves of the pair; missing halves are ignored.
    pub fn remove_timestamp_files(&self) -> Result<()> {
        self.gateway.remove()?;
        info!(
            "Removed license timestamp files {} and {}",
            self.record.encrypted_file().display(),
            self.record.checksum_file().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::storage::MemoryGateway;
    use crate::test_utils::get_test_config;
    use assert_matches::assert_matches;
    use chrono::{Duration, Local, TimeZone};

    fn issued_at() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).earliest().unwrap()
    }

    fn license_with(gateway: MemoryGateway, clock: FixedClock) -> LicenseTimestamp {
        LicenseTimestamp::from_config(get_test_config())
            .unwrap()
            .with_gateway(Box::new(gateway))
            .with_clock(Arc::new(clock))
    }

    #[test]
    fn test_record_validation() {
        assert!(LicenseRecord::new("a", "b", 0.1).validate().is_ok());
        assert_matches!(
            LicenseRecord::new("", "b", 0.1).validate(),
            Err(LicenseError::InvalidParameter(_))
        );
        assert_matches!(
            LicenseRecord::new("a", "", 0.1).validate(),
            Err(LicenseError::InvalidParameter(_))
        );
        assert_matches!(
            LicenseRecord::new("a", "b", -1.0).validate(),
            Err(LicenseError::InvalidParameter(_))
        );
        assert_matches!(
            LicenseRecord::new("a", "b", f64::NAN).validate(),
            Err(LicenseError::InvalidParameter(_))
        );
        assert_matches!(
            LicenseTimestamp::new(LicenseRecord::new("", "b", 1.0)),
            Err(LicenseError::InvalidParameter(_))
        );
    }

    #[test]
    fn test_create_then_inspect() {
        let gateway = MemoryGateway::new();
        let license = license_with(gateway.clone(), FixedClock::new(issued_at()));
        let issued = license.create_timestamp_file().unwrap();
        assert_eq!(issued.text, "2026-01-01T00:00:00Z");
        assert_eq!(
            issued.checksum,
            "4175107982102911572337829037626217029547179730611994484"
        );
        assert_eq!(license.inspect_timestamp().unwrap(), issued.text);
        assert!(gateway.presence().all());
    }

    #[test]
    fn test_second_create_leaves_pair_untouched() {
        let gateway = MemoryGateway::new();
        let license = license_with(gateway.clone(), FixedClock::new(issued_at()));
        license.create_timestamp_file().unwrap();
        let before = (gateway.raw_encrypted(), gateway.raw_checksum());

        let later = license_with(
            gateway.clone(),
            FixedClock::new(issued_at() + Duration::days(3)),
        );
        assert_matches!(later.create_timestamp_file(), Err(LicenseError::FileExist(_)));
        assert_eq!((gateway.raw_encrypted(), gateway.raw_checksum()), before);
    }

    #[test]
    fn test_evaluate_reports_state_and_elapsed_days() {
        let gateway = MemoryGateway::new();
        license_with(gateway.clone(), FixedClock::new(issued_at()))
            .create_timestamp_file()
            .unwrap();

        let license = license_with(
            gateway,
            FixedClock::new(issued_at() + Duration::seconds(4_320)),
        );
        let verdict = license.evaluate();
        assert_eq!(verdict.state, OperationState::Success);
        assert_eq!(verdict.timestamp.as_deref(), Some("2026-01-01T00:00:00Z"));
        assert!((verdict.elapsed_days.unwrap() - 0.05).abs() < 1e-12);
        assert!(!verdict.expired);
    }

    #[test]
    fn test_missing_pair_is_expired() {
        let license = license_with(MemoryGateway::new(), FixedClock::new(issued_at()));
        let verdict = license.evaluate();
        assert_eq!(verdict.state, OperationState::FileNotExist);
        assert!(verdict.expired);
        assert!(license.is_license_expired());
    }

    #[test]
    fn test_empty_pair_decodes_to_empty_text() {
        let gateway = MemoryGateway::new();
        gateway.set_raw_encrypted(Some(String::new()));
        gateway.set_raw_checksum(Some(String::new()));
        let license = license_with(gateway, FixedClock::new(issued_at()));
        assert_eq!(license.inspect_timestamp().unwrap(), "");
        let verdict = license.evaluate();
        assert_eq!(verdict.state, OperationState::Success);
        assert!(verdict.expired);
    }

    #[test]
    fn test_too_many_values_is_tampering() {
        let gateway = MemoryGateway::new();
        gateway.set_raw_encrypted(Some("41\n".repeat(21)));
        gateway.set_raw_checksum(Some("41".repeat(21)));
        let license = license_with(gateway, FixedClock::new(issued_at()));
        assert_matches!(
            license.inspect_timestamp(),
            Err(LicenseError::TimestampTampered(_))
        );
    }

    #[test]
    fn test_remove_then_create_again() {
        let gateway = MemoryGateway::new();
        let license = license_with(gateway.clone(), FixedClock::new(issued_at()));
        license.create_timestamp_file().unwrap();
        license.remove_timestamp_files().unwrap();
        assert!(!gateway.presence().any());
        license.create_timestamp_file().unwrap();
    }

    #[test]
    fn test_write_failure_is_reported() {
        let gateway = MemoryGateway::new();
        gateway.set_fail_on_write(true);
        let license = license_with(gateway, FixedClock::new(issued_at()));
        let result = license.create_timestamp_file();
        assert_eq!(OperationState::from(&result), OperationState::FileFailOpen);
    }
}
