//! Snapshot container errors.

use std::path::PathBuf;

use super::error_code::{self, FsdiffErrorCode};

/// Errors raised while writing or reading a snapshot container.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("cannot create snapshot file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open snapshot file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compression stream error: {source}")]
    Compression {
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on snapshot stream: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to encode {frame} frame: {message}")]
    Encode { frame: &'static str, message: String },

    #[error("corrupt frame at line {line}: {message}")]
    Decode { line: usize, message: String },

    #[error("snapshot stream has no header frame")]
    MissingHeader,

    #[error("snapshot {path} is truncated: no trailer frame")]
    Truncated { path: PathBuf },

    #[error("unsupported snapshot format {found} (supported: {supported})")]
    UnsupportedVersion { found: String, supported: String },
}

impl FsdiffErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Decode { .. } | Self::MissingHeader | Self::Truncated { .. } => {
                error_code::SNAPSHOT_CORRUPT
            }
            Self::UnsupportedVersion { .. } => error_code::VERSION_MISMATCH,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
