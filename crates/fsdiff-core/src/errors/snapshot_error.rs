//! Snapshot validation errors.

use super::error_code::{self, FsdiffErrorCode};

/// Structural problems found by `Snapshot::validate`.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot has no format version")]
    MissingVersion,

    #[error("snapshot contains no records")]
    Empty,

    #[error("{kind} count mismatch: stats say {expected}, records hold {actual}")]
    CountMismatch {
        kind: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("record keyed {key} carries path {path}")]
    KeyMismatch { key: String, path: String },

    #[error("directory {path} carries a content digest")]
    DirectoryDigest { path: String },
}

impl FsdiffErrorCode for SnapshotError {
    fn error_code(&self) -> &'static str {
        error_code::SNAPSHOT_INVALID
    }
}
