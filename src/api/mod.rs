// src/api/mod.rs

/// Synchronous create/inspect/expiry operations over one timestamp pair.
pub mod sync_api;

pub use sync_api::{IssuedTimestamp, LicenseRecord, LicenseTimestamp, LicenseVerdict};
