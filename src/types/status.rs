use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Outcome of a license timestamp operation.
///
/// The numeric codes (`0..=6`, in declaration order) and the descriptions are
/// a stable contract shared with the C ABI in [`crate::ffi`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    /// The operation completed without errors
    Success,
    /// An input parameter was invalid, so the operation did not run
    InvalidParameter,
    /// A file needed by the operation could not be opened
    FileFailOpen,
    /// A timestamp or checksum file is missing
    FileNotExist,
    /// A timestamp or checksum file already exists
    FileExist,
    /// The current time could not be read
    TimestampRetrievalError,
    /// The stored timestamp failed its checksum
    TimestampTampered,
}

/// Description reported for numeric codes outside the known range.
pub const UNKNOWN_STATE_DESCRIPTION: &str = "Unknown State";

impl OperationState {
    /// Fixed human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Success => "Successful Operation",
            Self::InvalidParameter => "Invalid Parameter passed to function",
            Self::FileFailOpen => "Failed to open a file",
            Self::FileNotExist => "File does not exist",
            Self::FileExist => "File exists",
            Self::TimestampRetrievalError => "Timestamp fails to be retrieved",
            Self::TimestampTampered => "Timestamp file has been tampered with",
        }
    }

    /// Numeric code of the state.
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Converts a numeric code back into a state.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::InvalidParameter),
            2 => Some(Self::FileFailOpen),
            3 => Some(Self::FileNotExist),
            4 => Some(Self::FileExist),
            5 => Some(Self::TimestampRetrievalError),
            6 => Some(Self::TimestampTampered),
            _ => None,
        }
    }

    /// Description for a raw numeric code, `"Unknown State"` if unrecognised.
    pub fn describe_code(code: i32) -> &'static str {
        Self::from_code(code)
            .map(|state| state.description())
            .unwrap_or(UNKNOWN_STATE_DESCRIPTION)
    }

    /// Whether the state is [`OperationState::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl<T> From<&crate::error::Result<T>> for OperationState {
    fn from(result: &crate::error::Result<T>) -> Self {
        match result {
            Ok(_) => OperationState::Success,
            Err(e) => e.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_codes_round_trip() {
        for state in OperationState::iter() {
            assert_eq!(OperationState::from_code(state.code()), Some(state));
        }
        assert_eq!(OperationState::Success.code(), 0);
        assert_eq!(OperationState::TimestampTampered.code(), 6);
        assert_eq!(OperationState::from_code(7), None);
        assert_eq!(OperationState::from_code(-1), None);
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(OperationState::Success.description(), "Successful Operation");
        assert_eq!(OperationState::FileExist.description(), "File exists");
        assert_eq!(
            OperationState::TimestampTampered.description(),
            "Timestamp file has been tampered with"
        );
        assert_eq!(OperationState::describe_code(42), "Unknown State");
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(OperationState::FileNotExist.to_string(), "FILE_NOT_EXIST");
        assert_eq!(
            OperationState::from_str("TIMESTAMP_RETRIEVAL_ERROR").unwrap(),
            OperationState::TimestampRetrievalError
        );
        assert!(OperationState::from_str("NOPE").is_err());
    }
}
