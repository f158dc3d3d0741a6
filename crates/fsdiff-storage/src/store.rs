//! SnapshotStore: save, load, and header-only reads.

use std::path::Path;

use chrono::Utc;
use fsdiff_core::config::StorageConfig;
use fsdiff_core::constants::FORMAT_VERSION;
use fsdiff_core::errors::StorageError;
use fsdiff_core::types::{FileRecord, FxHashMap, Snapshot, SnapshotHeader};

use crate::frame::{Frame, FrameKind, HeaderFrame};
use crate::reader::FileFrameReader;
use crate::writer::{SnapshotWriter, WriteSummary};

/// Persists snapshots with the configured compression and batching.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    config: StorageConfig,
}

impl SnapshotStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Write `snapshot` to `path`, stamping the current format version.
    /// Records are written in path order so identical snapshots produce
    /// identical record streams.
    pub fn save(&self, snapshot: &Snapshot, path: &Path) -> Result<WriteSummary, StorageError> {
        let header = HeaderFrame {
            format_version: FORMAT_VERSION.to_string(),
            system_info: snapshot.system_info.clone(),
            created: Utc::now(),
            streaming: false,
            stats: Some(snapshot.stats),
            root_digest: Some(snapshot.root_digest),
        };
        let mut writer = SnapshotWriter::with_header(path, header, &self.config)?;

        let mut records: Vec<&FileRecord> = snapshot.files.values().collect();
        records.sort_unstable_by(|a, b| a.path.cmp(&b.path));
        for record in records {
            writer.push(record.clone())?;
        }

        let summary = writer.finish_with(snapshot.stats, snapshot.root_digest)?;
        tracing::info!(
            path = %path.display(),
            records = snapshot.files.len(),
            batches = summary.batches,
            compressed_bytes = summary.compressed_bytes,
            "snapshot saved"
        );
        Ok(summary)
    }

    /// Read a full snapshot. The digest tree is rebuilt from the records and
    /// the root digest recomputed; a mismatch with the stored value is logged
    /// and the stored value kept.
    pub fn load(&self, path: &Path) -> Result<Snapshot, StorageError> {
        let mut reader = FileFrameReader::open(path)?;
        let header = match reader.next_frame()? {
            Some(Frame::Header(header)) => header,
            _ => return Err(StorageError::MissingHeader),
        };
        check_version(&header.format_version)?;

        let mut files: FxHashMap<String, FileRecord> = FxHashMap::default();
        let mut trailer = None;
        while let Some(frame) = reader.next_frame()? {
            match frame {
                Frame::Batch(batch) => {
                    for record in batch.records {
                        if let Some(previous) = files.insert(record.path.clone(), record) {
                            tracing::warn!(
                                path = %previous.path,
                                "duplicate record in snapshot; keeping the later entry"
                            );
                        }
                    }
                }
                Frame::Trailer(frame) => {
                    trailer = Some(frame);
                    break;
                }
                Frame::Header(_) => {
                    return Err(StorageError::Decode {
                        line: reader.line_no(),
                        message: "unexpected second header frame".to_string(),
                    });
                }
            }
        }
        let trailer = trailer.ok_or_else(|| StorageError::Truncated {
            path: path.to_path_buf(),
        })?;

        let mut snapshot = Snapshot {
            format_version: header.format_version,
            system_info: header.system_info,
            files,
            root_digest: trailer.root_digest,
            stats: trailer.stats,
            tree: None,
        };

        let recomputed = snapshot.compute_root_digest();
        if recomputed != snapshot.root_digest {
            tracing::warn!(
                path = %path.display(),
                stored = %snapshot.root_digest,
                recomputed = %recomputed,
                "root digest mismatch; snapshot records may have been altered"
            );
        }
        let tree_depth = snapshot.rebuild_tree().depth();
        tracing::debug!(
            path = %path.display(),
            records = snapshot.files.len(),
            tree_depth,
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Read only the leading metadata. For streaming snapshots the stats
    /// and root live in the trailer; batch frames are skipped without being
    /// decoded into records.
    pub fn load_header(&self, path: &Path) -> Result<SnapshotHeader, StorageError> {
        let mut reader = FileFrameReader::open(path)?;
        let header = match reader.next_frame()? {
            Some(Frame::Header(header)) => header,
            _ => return Err(StorageError::MissingHeader),
        };
        check_version(&header.format_version)?;

        let (stats, root_digest) = match (header.stats, header.root_digest) {
            (Some(stats), Some(root)) => (stats, root),
            _ => match reader.skip_to(FrameKind::Trailer)? {
                Some(Frame::Trailer(trailer)) => (trailer.stats, trailer.root_digest),
                _ => {
                    return Err(StorageError::Truncated {
                        path: path.to_path_buf(),
                    })
                }
            },
        };

        Ok(SnapshotHeader {
            format_version: header.format_version,
            system_info: header.system_info,
            stats,
            root_digest,
            created: header.created,
        })
    }
}

/// Accept any version sharing the current major component.
fn check_version(found: &str) -> Result<(), StorageError> {
    let major = |v: &str| v.split('.').next().unwrap_or_default().to_string();
    if found.is_empty() || major(found) != major(FORMAT_VERSION) {
        return Err(StorageError::UnsupportedVersion {
            found: found.to_string(),
            supported: format!("{}.x", major(FORMAT_VERSION)),
        });
    }
    Ok(())
}

/// Save with default storage settings.
pub fn save(snapshot: &Snapshot, path: &Path) -> Result<WriteSummary, StorageError> {
    SnapshotStore::default().save(snapshot, path)
}

/// Load with default storage settings.
pub fn load(path: &Path) -> Result<Snapshot, StorageError> {
    SnapshotStore::default().load(path)
}

/// Read a snapshot header with default storage settings.
pub fn load_header(path: &Path) -> Result<SnapshotHeader, StorageError> {
    SnapshotStore::default().load_header(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_check_accepts_same_major() {
        assert!(check_version("2.0.0").is_ok());
        assert!(check_version("2.7.1").is_ok());
        assert!(matches!(
            check_version("3.0.0"),
            Err(StorageError::UnsupportedVersion { .. })
        ));
        assert!(check_version("").is_err());
    }
}
