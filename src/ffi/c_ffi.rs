// src/ffi/c_ffi.rs

//! Minimal C-compatible FFI over [`LicenseTimestamp`].
//!
//! Every call takes the two file paths and the duration, and returns an
//! [`OperationState`] code. Strings handed out by the library must be released
//! with [`license_ts_free_string`].

use libc::{c_char, c_double, c_int};
use std::ffi::{CStr, CString};

use crate::api::sync_api::{LicenseRecord, LicenseTimestamp};
use crate::error::{LicenseError, Result};
use crate::types::OperationState;

unsafe fn path_arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(LicenseError::invalid_parameter(format!("{} is null", name)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| LicenseError::invalid_parameter(format!("{} is not valid UTF-8", name)))
}

unsafe fn license_from(
    encrypted_file: *const c_char,
    checksum_file: *const c_char,
    duration_days: c_double,
) -> Result<LicenseTimestamp> {
    let encrypted = path_arg(encrypted_file, "encrypted_file")?;
    let checksum = path_arg(checksum_file, "checksum_file")?;
    LicenseTimestamp::new(LicenseRecord::new(encrypted, checksum, duration_days))
}

/// Creates a new timestamp pair at the given paths.
///
/// # Safety
/// The path arguments must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn license_ts_create(
    encrypted_file: *const c_char,
    checksum_file: *const c_char,
    duration_days: c_double,
) -> c_int {
    let result = license_from(encrypted_file, checksum_file, duration_days)
        .and_then(|license| license.create_timestamp_file());
    OperationState::from(&result).code()
}

/// Decodes the stored timestamp into `*out`.
///
/// On success `*out` receives a string owned by the caller; release it with
/// [`license_ts_free_string`]. On failure `*out` is left untouched.
///
/// # Safety
/// The path arguments must be null or valid NUL-terminated strings, and `out`
/// must be null or point to writable storage for one pointer.
#[no_mangle]
pub unsafe extern "C" fn license_ts_inspect(
    encrypted_file: *const c_char,
    checksum_file: *const c_char,
    duration_days: c_double,
    out: *mut *mut c_char,
) -> c_int {
    if out.is_null() {
        return OperationState::InvalidParameter.code();
    }
    let result = license_from(encrypted_file, checksum_file, duration_days)
        .and_then(|license| license.inspect_timestamp())
        .and_then(|text| {
            CString::new(text)
                .map_err(|_| LicenseError::tampered("decoded timestamp contains a NUL byte"))
        });
    match result {
        Ok(text) => {
            *out = text.into_raw();
            OperationState::Success.code()
        }
        Err(e) => e.state().code(),
    }
}

/// Returns 1 if the license is expired or cannot be verified, 0 otherwise.
///
/// # Safety
/// The path arguments must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn license_ts_is_expired(
    encrypted_file: *const c_char,
    checksum_file: *const c_char,
    duration_days: c_double,
) -> c_int {
    match license_from(encrypted_file, checksum_file, duration_days) {
        Ok(license) => c_int::from(license.is_license_expired()),
        Err(_) => 1,
    }
}

/// Static description of a status code; never free the result.
#[no_mangle]
pub extern "C" fn license_ts_state_description(code: c_int) -> *const c_char {
    let text: &'static [u8] = match OperationState::from_code(code) {
        Some(OperationState::Success) => b"Successful Operation\0",
        Some(OperationState::InvalidParameter) => b"Invalid Parameter passed to function\0",
        Some(OperationState::FileFailOpen) => b"Failed to open a file\0",
        Some(OperationState::FileNotExist) => b"File does not exist\0",
        Some(OperationState::FileExist) => b"File exists\0",
        Some(OperationState::TimestampRetrievalError) => b"Timestamp fails to be retrieved\0",
        Some(OperationState::TimestampTampered) => b"Timestamp file has been tampered with\0",
        None => b"Unknown State\0",
    };
    text.as_ptr() as *const c_char
}

/// Free a string returned by the FFI.
///
/// # Safety
/// `s` must be null or a pointer obtained from [`license_ts_inspect`] that has
/// not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn license_ts_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    drop(CString::from_raw(s));
}
