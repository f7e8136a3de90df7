use license_timestamp::config::ConfigError;
use license_timestamp::error::LicenseError;
use license_timestamp::types::{
    CipherScheme, LogLevel, OperationState, StorageType, UNKNOWN_STATE_DESCRIPTION,
};
use std::str::FromStr;

#[test]
fn test_cipher_scheme_display() {
    assert_eq!(CipherScheme::default().to_string(), "modular");
    assert_eq!(CipherScheme::Legacy.to_string(), "legacy");
    assert_eq!(CipherScheme::from_str("LEGACY").unwrap(), CipherScheme::Legacy);
    assert!(CipherScheme::from_str("rsa").is_err());
}

#[test]
fn test_storage_type_parse_and_display() {
    assert_eq!(StorageType::from_str("memory").unwrap(), StorageType::Memory);
    assert_eq!(StorageType::from_str("file").unwrap(), StorageType::File);
    assert!(StorageType::from_str("other").is_err());
    assert_eq!(StorageType::default().to_string(), "file");
}

#[test]
fn test_log_level_display_and_parse() {
    assert_eq!(LogLevel::Debug.to_string(), "debug");
    assert_eq!("error".parse::<LogLevel>().unwrap(), LogLevel::Error);
    assert!("bogus".parse::<LogLevel>().is_err());
}

#[test]
fn test_operation_state_codes_are_stable() {
    let expected = [
        (OperationState::Success, "Successful Operation"),
        (OperationState::InvalidParameter, "Invalid Parameter passed to function"),
        (OperationState::FileFailOpen, "Failed to open a file"),
        (OperationState::FileNotExist, "File does not exist"),
        (OperationState::FileExist, "File exists"),
        (OperationState::TimestampRetrievalError, "Timestamp fails to be retrieved"),
        (OperationState::TimestampTampered, "Timestamp file has been tampered with"),
    ];
    for (code, (state, description)) in expected.iter().enumerate() {
        assert_eq!(state.code(), code as i32);
        assert_eq!(state.description(), *description);
        assert_eq!(OperationState::describe_code(code as i32), *description);
    }
    assert_eq!(OperationState::describe_code(99), UNKNOWN_STATE_DESCRIPTION);
    assert_eq!(OperationState::TimestampTampered.to_string(), "TIMESTAMP_TAMPERED");
}

#[test]
fn test_config_error_invalid_value_helper() {
    let err = ConfigError::invalid_value("f", 42, "nope");
    match err {
        ConfigError::InvalidValue { field, value, reason } => {
            assert_eq!(field, "f");
            assert_eq!(value, "42");
            assert_eq!(reason, "nope");
        }
        _ => panic!("wrong variant"),
    }
}

#[test]
fn test_license_error_helper_constructors() {
    let e = LicenseError::invalid_parameter("bad");
    assert!(matches!(e, LicenseError::InvalidParameter(ref s) if s == "bad"));
    assert_eq!(e.state(), OperationState::InvalidParameter);

    let e = LicenseError::file_not_exist("x");
    assert!(matches!(e, LicenseError::FileNotExist(ref s) if s == "x"));
    assert_eq!(e.state(), OperationState::FileNotExist);

    let e = LicenseError::tampered("y");
    assert_eq!(e.state(), OperationState::TimestampTampered);

    let e: LicenseError = ConfigError::validation_error("z").into();
    assert_eq!(e.state(), OperationState::InvalidParameter);
}
