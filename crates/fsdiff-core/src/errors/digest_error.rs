//! Digest tree errors.

use super::error_code::{self, FsdiffErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("path not found in digest tree: {path}")]
    PathNotFound { path: String },

    #[error("digest tree is empty")]
    EmptyTree,
}

impl FsdiffErrorCode for DigestError {
    fn error_code(&self) -> &'static str {
        error_code::DIGEST_ERROR
    }
}
