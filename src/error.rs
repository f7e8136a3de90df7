//! Error types for the license timestamp system
//!
//! This module defines the error types used throughout the crate. The main
//! error type is `LicenseError`; every variant maps onto one of the stable
//! [`OperationState`] status codes through [`LicenseError::state`].

use thiserror::Error;

use crate::types::OperationState;

/// Main error type for the license timestamp system
#[derive(Error, Debug)]
pub enum LicenseError {
    /// A caller supplied an empty, null, or out-of-range parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A timestamp or checksum file could not be opened
    #[error("Failed to open '{path}': {source}")]
    FileFailOpen {
        /// The file that failed to open.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A timestamp or checksum file is missing
    #[error("File does not exist: {0}")]
    FileNotExist(String),

    /// A timestamp or checksum file is already present
    #[error("File exists: {0}")]
    FileExist(String),

    /// The current time could not be read or formatted
    #[error("Timestamp retrieval error: {0}")]
    TimestampRetrieval(String),

    /// The stored timestamp does not match its checksum or cannot be decoded
    #[error("Timestamp tampered: {0}")]
    TimestampTampered(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for operations that can fail with a [LicenseError]
pub type Result<T> = std::result::Result<T, LicenseError>;

impl LicenseError {
    /// Create a new invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        LicenseError::InvalidParameter(msg.into())
    }

    /// Create a new file-open error for `path`
    pub fn file_fail_open<S: Into<String>>(path: S, source: std::io::Error) -> Self {
        LicenseError::FileFailOpen { path: path.into(), source }
    }

    /// Create a new missing-file error
    pub fn file_not_exist<S: Into<String>>(what: S) -> Self {
        LicenseError::FileNotExist(what.into())
    }

    /// Create a new file-exists error
    pub fn file_exist<S: Into<String>>(what: S) -> Self {
        LicenseError::FileExist(what.into())
    }

    /// Create a new timestamp retrieval error
    pub fn timestamp_retrieval<S: Into<String>>(msg: S) -> Self {
        LicenseError::TimestampRetrieval(msg.into())
    }

    /// Create a new tamper error
    pub fn tampered<S: Into<String>>(msg: S) -> Self {
        LicenseError::TimestampTampered(msg.into())
    }

    /// The stable status code reported to callers for this error.
    pub fn state(&self) -> OperationState {
        match self {
            LicenseError::InvalidParameter(_) | LicenseError::Config(_) => {
                OperationState::InvalidParameter
            }
            LicenseError::FileFailOpen { .. } => OperationState::FileFailOpen,
            LicenseError::FileNotExist(_) => OperationState::FileNotExist,
            LicenseError::FileExist(_) => OperationState::FileExist,
            LicenseError::TimestampRetrieval(_) => OperationState::TimestampRetrievalError,
            LicenseError::TimestampTampered(_) => OperationState::TimestampTampered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_every_variant_maps_to_a_state() {
        let cases = vec![
            (LicenseError::invalid_parameter("x"), OperationState::InvalidParameter),
            (
                LicenseError::file_fail_open("a.txt", io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
                OperationState::FileFailOpen,
            ),
            (LicenseError::file_not_exist("a.txt"), OperationState::FileNotExist),
            (LicenseError::file_exist("a.txt"), OperationState::FileExist),
            (LicenseError::timestamp_retrieval("clock"), OperationState::TimestampRetrievalError),
            (LicenseError::tampered("checksum"), OperationState::TimestampTampered),
            (
                LicenseError::Config(crate::config::ConfigError::validation_error("bad")),
                OperationState::InvalidParameter,
            ),
        ];
        for (err, state) in cases {
            assert_eq!(err.state(), state, "wrong state for {:?}", err);
        }
    }

    #[test]
    fn test_file_fail_open_message_names_path() {
        let err = LicenseError::file_fail_open("Encrypted.txt", io::Error::new(io::ErrorKind::Other, "nope"));
        assert_eq!(err.to_string(), "Failed to open 'Encrypted.txt': nope");
    }
}
