//! Scanner errors.

use std::path::PathBuf;

use super::error_code::{self, FsdiffErrorCode};
use super::StorageError;

/// Fatal scan failures. Per-file stat or read failures are counted in
/// `SnapshotStats::error_count` and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot read scan root {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scan root is not a directory: {path}")]
    RootNotDirectory { path: PathBuf },

    #[error("scan cancelled after {files_processed} entries")]
    Cancelled { files_processed: u64 },

    #[error("failed to start worker thread: {source}")]
    WorkerSpawn {
        #[source]
        source: std::io::Error,
    },

    #[error("scan thread {thread} panicked")]
    ThreadPanicked { thread: &'static str },

    #[error("all hashing workers exited before the walk finished")]
    WorkersGone,

    #[error("snapshot output failed: {0}")]
    Output(#[from] StorageError),
}

impl FsdiffErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled { .. } => error_code::CANCELLED,
            Self::RootUnreadable { .. } | Self::RootNotDirectory { .. } => {
                error_code::ROOT_UNREADABLE
            }
            Self::Output(inner) => inner.error_code(),
            Self::WorkerSpawn { .. } | Self::ThreadPanicked { .. } | Self::WorkersGone => {
                error_code::SCAN_ERROR
            }
        }
    }
}
