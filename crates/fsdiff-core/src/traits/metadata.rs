//! Platform metadata provider seam.

use std::fs::Metadata;
use std::path::Path;

use crate::types::SecurityMetadata;

/// Ownership, permission, and security attributes of one path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformFileInfo {
    pub owner_id: u32,
    pub group_id: u32,
    /// Full `st_mode` (type and permission bits).
    pub permission_bits: u32,
    pub security_metadata: Option<SecurityMetadata>,
}

/// Supplies platform-specific metadata for scanned paths.
///
/// Called from worker threads with the `lstat` result the worker already
/// holds. Implementations must not fail: unavailable values are zeroed and
/// missing security metadata is `None`.
pub trait FileMetadataProvider: Send + Sync {
    fn get_info(&self, path: &Path, metadata: &Metadata) -> PlatformFileInfo;
}

/// Provider that reports nothing beyond zeroed identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMetadataProvider;

impl FileMetadataProvider for NullMetadataProvider {
    fn get_info(&self, _path: &Path, _metadata: &Metadata) -> PlatformFileInfo {
        PlatformFileInfo::default()
    }
}
