// src/storage/memory.rs

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{LicenseError, Result};
use crate::storage::{
    format_values, parse_checksum, parse_values, PersistenceGateway, Presence, StoredTimestamp,
};

#[derive(Debug, Default)]
struct Slots {
    encrypted: Option<String>,
    checksum: Option<String>,
    fail_on_write: bool,
}

/// An in-memory gateway, primarily for testing.
///
/// Both halves are kept as the exact text the file gateway would write, so
/// tests can tamper with them through [`MemoryGateway::set_raw_encrypted`]
/// and [`MemoryGateway::set_raw_checksum`]. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    slots: Arc<Mutex<Slots>>,
}

impl MemoryGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes every subsequent `write` fail with `FileFailOpen`.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.slots().fail_on_write = fail;
    }

    /// The stored encrypted text, if any.
    pub fn raw_encrypted(&self) -> Option<String> {
        self.slots().encrypted.clone()
    }

    /// The stored checksum text, if any.
    pub fn raw_checksum(&self) -> Option<String> {
        self.slots().checksum.clone()
    }

    /// Replaces the encrypted text; `None` removes it.
    pub fn set_raw_encrypted(&self, text: Option<String>) {
        self.slots().encrypted = text;
    }

    /// Replaces the checksum text; `None` removes it.
    pub fn set_raw_checksum(&self, text: Option<String>) {
        self.slots().checksum = text;
    }
}

impl PersistenceGateway for MemoryGateway {
    fn presence(&self) -> Presence {
        let slots = self.slots();
        Presence {
            encrypted: slots.encrypted.is_some(),
            checksum: slots.checksum.is_some(),
        }
    }

    fn write(&self, values: &[f64], checksum: &str) -> Result<()> {
        if values.is_empty() {
            return Err(LicenseError::invalid_parameter("no encoded values to store"));
        }
        if checksum.is_empty() {
            return Err(LicenseError::invalid_parameter("checksum is empty"));
        }
        let mut slots = self.slots();
        if slots.encrypted.is_some() || slots.checksum.is_some() {
            return Err(LicenseError::file_exist("memory slot already holds a timestamp"));
        }
        if slots.fail_on_write {
            return Err(LicenseError::file_fail_open(
                "memory",
                std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            ));
        }
        slots.encrypted = Some(format_values(values));
        slots.checksum = Some(format!("{}\n", checksum));
        Ok(())
    }

    fn read(&self) -> Result<StoredTimestamp> {
        let slots = self.slots();
        match (&slots.encrypted, &slots.checksum) {
            (Some(encrypted), Some(checksum)) => Ok(StoredTimestamp {
                values: parse_values(encrypted)?,
                checksum: parse_checksum(checksum),
            }),
            _ => Err(LicenseError::file_not_exist(
                "license file does not exist for verification",
            )),
        }
    }

    fn remove(&self) -> Result<()> {
        let mut slots = self.slots();
        slots.encrypted = None;
        slots.checksum = None;
        Ok(())
    }
}
