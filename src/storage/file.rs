// src/storage/file.rs

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, error};

use crate::error::{LicenseError, Result};
use crate::storage::{
    format_values, parse_checksum, parse_values, PersistenceGateway, Presence, StoredTimestamp,
};

/// Stores the timestamp pair as two text files.
///
/// The encrypted file holds one value per line at 17 significant digits; the
/// checksum file holds the checksum string followed by a newline. Files are
/// created with `create_new`, so an existing pair is never overwritten.
#[derive(Debug, Clone)]
pub struct FileGateway {
    encrypted_path: PathBuf,
    checksum_path: PathBuf,
}

impl FileGateway {
    /// Creates a gateway over the two paths; neither may be empty.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(encrypted_path: P, checksum_path: Q) -> Result<Self> {
        let encrypted_path = encrypted_path.as_ref().to_path_buf();
        let checksum_path = checksum_path.as_ref().to_path_buf();
        if encrypted_path.as_os_str().is_empty() {
            return Err(LicenseError::invalid_parameter("encrypted file path is empty"));
        }
        if checksum_path.as_os_str().is_empty() {
            return Err(LicenseError::invalid_parameter("checksum file path is empty"));
        }
        Ok(Self {
            encrypted_path,
            checksum_path,
        })
    }

    /// Path of the encrypted timestamp file.
    pub fn encrypted_path(&self) -> &Path {
        &self.encrypted_path
    }

    /// Path of the checksum file.
    pub fn checksum_path(&self) -> &Path {
        &self.checksum_path
    }

    fn create(path: &Path) -> Result<File> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    LicenseError::file_exist(path.display().to_string())
                } else {
                    error!("Unable to open file, {}: {}", path.display(), e);
                    LicenseError::file_fail_open(path.display().to_string(), e)
                }
            })
    }

    fn write_all(file: File, path: &Path, contents: &str) -> Result<()> {
        let mut writer = BufWriter::new(file);
        writer
            .write_all(contents.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| {
                error!("Failed to write {}: {}", path.display(), e);
                LicenseError::file_fail_open(path.display().to_string(), e)
            })
    }

    fn read_to_string(path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                LicenseError::file_not_exist(path.display().to_string())
            } else {
                error!("Unable to open file, {}: {}", path.display(), e);
                LicenseError::file_fail_open(path.display().to_string(), e)
            }
        })
    }

    fn remove_if_present(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LicenseError::file_fail_open(path.display().to_string(), e)),
        }
    }
}

impl PersistenceGateway for FileGateway {
    fn presence(&self) -> Presence {
        Presence {
            encrypted: self.encrypted_path.exists(),
            checksum: self.checksum_path.exists(),
        }
    }

    fn write(&self, values: &[f64], checksum: &str) -> Result<()> {
        if values.is_empty() {
            return Err(LicenseError::invalid_parameter("no encoded values to store"));
        }
        if checksum.is_empty() {
            return Err(LicenseError::invalid_parameter("checksum is empty"));
        }

        let encrypted = Self::create(&self.encrypted_path)?;
        let checksum_file = match Self::create(&self.checksum_path) {
            Ok(file) => file,
            Err(e) => {
                drop(encrypted);
                // A lone encrypted file would block every later attempt
                Self::remove_if_present(&self.encrypted_path)?;
                return Err(e);
            }
        };

        Self::write_all(encrypted, &self.encrypted_path, &format_values(values))?;
        Self::write_all(checksum_file, &self.checksum_path, &format!("{}\n", checksum))?;
        debug!(
            "Stored {} values in {} and checksum in {}",
            values.len(),
            self.encrypted_path.display(),
            self.checksum_path.display()
        );
        Ok(())
    }

    fn read(&self) -> Result<StoredTimestamp> {
        let presence = self.presence();
        if !presence.all() {
            return Err(LicenseError::file_not_exist(format!(
                "license file does not exist for verification ({}: {}, {}: {})",
                self.encrypted_path.display(),
                presence.encrypted,
                self.checksum_path.display(),
                presence.checksum
            )));
        }

        let values = parse_values(&Self::read_to_string(&self.encrypted_path)?)?;
        let checksum = parse_checksum(&Self::read_to_string(&self.checksum_path)?);
        Ok(StoredTimestamp { values, checksum })
    }

    fn remove(&self) -> Result<()> {
        Self::remove_if_present(&self.encrypted_path)?;
        Self::remove_if_present(&self.checksum_path)
    }
}
