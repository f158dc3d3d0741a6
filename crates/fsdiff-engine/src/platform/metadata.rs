//! Default metadata provider backed by `lstat`.

use std::fs::Metadata;
use std::path::Path;

use fsdiff_core::traits::{FileMetadataProvider, PlatformFileInfo};
use fsdiff_core::types::file_record::{S_IFDIR, S_IFLNK, S_IFREG};

/// Fills owner, group, and mode from the stat result. Never reports
/// security metadata; richer providers plug in through the same trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatMetadataProvider;

impl FileMetadataProvider for StatMetadataProvider {
    #[cfg(unix)]
    fn get_info(&self, _path: &Path, metadata: &Metadata) -> PlatformFileInfo {
        use std::os::unix::fs::MetadataExt;

        PlatformFileInfo {
            owner_id: metadata.uid(),
            group_id: metadata.gid(),
            permission_bits: metadata.mode(),
            security_metadata: None,
        }
    }

    #[cfg(not(unix))]
    fn get_info(&self, _path: &Path, metadata: &Metadata) -> PlatformFileInfo {
        PlatformFileInfo {
            permission_bits: portable_mode(metadata),
            ..PlatformFileInfo::default()
        }
    }
}

/// `st_mode`-shaped bits derived from what every platform reports: file
/// type and the read-only flag.
pub fn portable_mode(metadata: &Metadata) -> u32 {
    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        S_IFLNK | 0o777
    } else if file_type.is_dir() {
        S_IFDIR | 0o755
    } else if metadata.permissions().readonly() {
        S_IFREG | 0o444
    } else {
        S_IFREG | 0o644
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsdiff_core::types::file_record::S_IFMT;

    #[test]
    fn stat_provider_reports_type_bits() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"x").unwrap();

        let provider = StatMetadataProvider;
        let file_meta = std::fs::symlink_metadata(&file).unwrap();
        let dir_meta = std::fs::symlink_metadata(dir.path()).unwrap();
        assert_eq!(provider.get_info(&file, &file_meta).permission_bits & S_IFMT, S_IFREG);
        assert_eq!(provider.get_info(dir.path(), &dir_meta).permission_bits & S_IFMT, S_IFDIR);
        assert!(provider.get_info(&file, &file_meta).security_metadata.is_none());
    }

    #[test]
    fn portable_mode_marks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let meta = std::fs::symlink_metadata(dir.path()).unwrap();
        assert_eq!(portable_mode(&meta), S_IFDIR | 0o755);
    }
}
