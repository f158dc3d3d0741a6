//! FsdiffErrorCode trait and the stable code strings.

/// Maps an error to a stable, machine-readable code.
/// Every error enum implements this so callers (the CLI, scripts parsing
/// its stderr) can branch on the code instead of the message.
pub trait FsdiffErrorCode {
    /// Returns the error code string (e.g., "SCAN_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const CANCELLED: &str = "CANCELLED";
pub const ROOT_UNREADABLE: &str = "ROOT_UNREADABLE";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const SNAPSHOT_CORRUPT: &str = "SNAPSHOT_CORRUPT";
pub const VERSION_MISMATCH: &str = "VERSION_MISMATCH";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const DIGEST_ERROR: &str = "DIGEST_ERROR";
pub const SNAPSHOT_INVALID: &str = "SNAPSHOT_INVALID";
