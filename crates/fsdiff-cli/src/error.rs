//! Errors surfaced by the command-line front end.

use std::path::PathBuf;

use fsdiff_core::errors::{
    error_code, ConfigError, FsdiffErrorCode, ScanError, SnapshotError, StorageError,
};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("snapshot {path} failed verification: {reason}")]
    Verification { path: PathBuf, reason: String },

    #[error("cannot write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl FsdiffErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Scan(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Snapshot(e) => e.error_code(),
            Self::Verification { .. } => error_code::SNAPSHOT_INVALID,
            Self::Output { .. } | Self::Json(_) => error_code::STORAGE_ERROR,
        }
    }
}
