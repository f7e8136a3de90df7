// src/ffi/mod.rs

/// C-compatible Foreign Function Interface for license timestamps.
pub mod c_ffi;
