//! Core type definitions shared by the license timestamp modules

mod log_level;
mod scheme;
mod status;
mod storage;

pub use log_level::LogLevel;
pub use scheme::CipherScheme;
pub use status::{OperationState, UNKNOWN_STATE_DESCRIPTION};
pub use storage::StorageType;
