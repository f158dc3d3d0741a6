//! Error types for every fsdiff subsystem.
//! One `thiserror` enum per subsystem, each carrying a stable error code.

pub mod config_error;
pub mod digest_error;
pub mod error_code;
pub mod scan_error;
pub mod snapshot_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use digest_error::DigestError;
pub use error_code::FsdiffErrorCode;
pub use scan_error::ScanError;
pub use snapshot_error::SnapshotError;
pub use storage_error::StorageError;
