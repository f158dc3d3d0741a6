//! Snapshot: a point-in-time capture of a filesystem tree.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::collections::FxHashMap;
use super::file_record::FileRecord;
use super::serde_helpers::duration_millis;
use super::system_info::SystemInfo;
use crate::constants::FORMAT_VERSION;
use crate::digest::{self, DigestTree, RootDigest};
use crate::errors::SnapshotError;

/// Counters finalized at the end of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapshotStats {
    /// Non-directory records.
    pub file_count: u64,
    pub dir_count: u64,
    /// Sum of sizes of non-directory records.
    pub total_size: u64,
    pub error_count: u64,
    #[serde(with = "duration_millis")]
    pub scan_duration: Duration,
}

impl SnapshotStats {
    /// Count records; `error_count` and `scan_duration` are left at zero.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a FileRecord>,
    {
        let mut stats = Self::default();
        for record in records {
            stats.observe(record);
        }
        stats
    }

    /// Account for one record.
    pub fn observe(&mut self, record: &FileRecord) {
        if record.is_dir {
            self.dir_count += 1;
        } else {
            self.file_count += 1;
            self.total_size += record.size;
        }
    }
}

/// Leading metadata of a persisted snapshot, readable without the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub format_version: String,
    pub system_info: SystemInfo,
    pub stats: SnapshotStats,
    pub root_digest: RootDigest,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: String,
    pub system_info: SystemInfo,
    /// Path to record. Exactly one record per path.
    pub files: FxHashMap<String, FileRecord>,
    pub root_digest: RootDigest,
    pub stats: SnapshotStats,
    /// Derived structure, rebuilt on load and never persisted.
    #[serde(skip)]
    pub tree: Option<DigestTree>,
}

impl Snapshot {
    /// Assemble a snapshot from records, computing stats and root digest.
    pub fn from_records<I>(system_info: SystemInfo, records: I) -> Self
    where
        I: IntoIterator<Item = FileRecord>,
    {
        let files: FxHashMap<String, FileRecord> = records
            .into_iter()
            .map(|record| (record.path.clone(), record))
            .collect();
        let stats = SnapshotStats::from_records(files.values());
        let mut snapshot = Self {
            format_version: FORMAT_VERSION.to_string(),
            system_info,
            files,
            root_digest: RootDigest::EMPTY,
            stats,
            tree: None,
        };
        snapshot.root_digest = snapshot.compute_root_digest();
        snapshot
    }

    /// Order-independent digest of the current file mapping.
    pub fn compute_root_digest(&self) -> RootDigest {
        digest::digest(self.files.par_iter().map(|(_, record)| record))
    }

    /// True when the stored root digest matches the file mapping.
    pub fn verify_root_digest(&self) -> bool {
        self.compute_root_digest() == self.root_digest
    }

    /// Rebuild the hierarchical tree from the file mapping.
    pub fn rebuild_tree(&mut self) -> &DigestTree {
        self.tree.insert(DigestTree::build(self.files.values()))
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn header(&self) -> SnapshotHeader {
        SnapshotHeader {
            format_version: self.format_version.clone(),
            system_info: self.system_info.clone(),
            stats: self.stats,
            root_digest: self.root_digest,
            created: self.system_info.timestamp,
        }
    }

    /// Structural checks: version present, counts agree with records,
    /// keys agree with record paths, directories carry no digest.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.format_version.is_empty() {
            return Err(SnapshotError::MissingVersion);
        }
        if self.files.is_empty() {
            return Err(SnapshotError::Empty);
        }
        for (key, record) in &self.files {
            if key != &record.path {
                return Err(SnapshotError::KeyMismatch {
                    key: key.clone(),
                    path: record.path.clone(),
                });
            }
            if record.is_dir && !record.content_digest.is_empty() {
                return Err(SnapshotError::DirectoryDigest {
                    path: record.path.clone(),
                });
            }
        }
        let actual = SnapshotStats::from_records(self.files.values());
        if actual.file_count != self.stats.file_count {
            return Err(SnapshotError::CountMismatch {
                kind: "file",
                expected: self.stats.file_count,
                actual: actual.file_count,
            });
        }
        if actual.dir_count != self.stats.dir_count {
            return Err(SnapshotError::CountMismatch {
                kind: "directory",
                expected: self.stats.dir_count,
                actual: actual.dir_count,
            });
        }
        Ok(())
    }

    /// New snapshot holding only records accepted by `keep`, with stats and
    /// root digest recomputed. Error count and duration are carried over.
    pub fn filter_files<F>(&self, mut keep: F) -> Snapshot
    where
        F: FnMut(&FileRecord) -> bool,
    {
        let records = self.files.values().filter(|r| keep(*r)).cloned();
        let mut filtered = Snapshot::from_records(self.system_info.clone(), records);
        filtered.format_version = self.format_version.clone();
        filtered.stats.error_count = self.stats.error_count;
        filtered.stats.scan_duration = self.stats.scan_duration;
        filtered
    }

    /// Parent directory path to its child directory paths, both sorted.
    pub fn directory_tree(&self) -> BTreeMap<String, Vec<String>> {
        let mut tree: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for record in self.files.values().filter(|r| r.is_dir) {
            if let Some(parent) = parent_dir(&record.path) {
                tree.entry(parent.to_string())
                    .or_default()
                    .push(record.path.clone());
            }
        }
        for children in tree.values_mut() {
            children.sort();
        }
        tree
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "snapshot {} of {} on {}: {} files, {} dirs, {} bytes, {} errors, root {}",
            self.format_version,
            self.system_info.scan_root,
            self.system_info.hostname,
            self.stats.file_count,
            self.stats.dir_count,
            self.stats.total_size,
            self.stats.error_count,
            self.root_digest,
        )
    }
}

/// Parent of a slash-separated path; `None` for the root or a bare name.
fn parent_dir(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) => Some("/"),
        Some(index) => Some(&trimmed[..index]),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, is_dir: bool, size: u64) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            content_digest: if is_dir { String::new() } else { "ab".to_string() },
            size,
            mode: if is_dir { 0o040_755 } else { 0o100_644 },
            mod_time: DateTime::<Utc>::UNIX_EPOCH,
            is_dir,
            owner_id: 0,
            group_id: 0,
            security_metadata: None,
        }
    }

    fn sample() -> Snapshot {
        Snapshot::from_records(
            SystemInfo::for_root("/r"),
            vec![
                record("/r", true, 0),
                record("/r/a.txt", false, 2),
                record("/r/b", true, 0),
                record("/r/b/c.txt", false, 5),
            ],
        )
    }

    #[test]
    fn from_records_counts_and_digests() {
        let snap = sample();
        assert_eq!(snap.stats.file_count, 2);
        assert_eq!(snap.stats.dir_count, 2);
        assert_eq!(snap.stats.total_size, 7);
        assert!(!snap.root_digest.is_empty());
        assert!(snap.verify_root_digest());
        assert!(snap.validate().is_ok());
    }

    #[test]
    fn validate_catches_count_mismatch() {
        let mut snap = sample();
        snap.stats.file_count = 9;
        assert!(matches!(
            snap.validate(),
            Err(SnapshotError::CountMismatch { kind: "file", .. })
        ));
    }

    #[test]
    fn filter_files_recomputes() {
        let snap = sample();
        let only_dirs = snap.filter_files(|r| r.is_dir);
        assert_eq!(only_dirs.stats.file_count, 0);
        assert_eq!(only_dirs.stats.dir_count, 2);
        assert_eq!(only_dirs.stats.total_size, 0);
        assert!(only_dirs.verify_root_digest());
        assert_ne!(only_dirs.root_digest, snap.root_digest);
    }

    #[test]
    fn directory_tree_maps_parents() {
        let tree = sample().directory_tree();
        assert_eq!(tree.get("/"), Some(&vec!["/r".to_string()]));
        assert_eq!(tree.get("/r"), Some(&vec!["/r/b".to_string()]));
    }

    #[test]
    fn rebuild_tree_covers_every_record() {
        let mut snap = sample();
        let leaves = snap.rebuild_tree().leaf_count();
        assert_eq!(leaves, 4);
        assert!(snap.tree.as_ref().is_some_and(|t| t.verify_integrity()));
    }

    #[test]
    fn summary_names_counts_and_root() {
        let snap = sample();
        let line = snap.summary();
        assert!(line.contains("of /r"));
        assert!(line.contains("2 files, 2 dirs, 7 bytes, 0 errors"));
        assert!(line.ends_with(&snap.root_digest.to_string()));
    }

    #[test]
    fn parent_dir_edges() {
        assert_eq!(parent_dir("/"), None);
        assert_eq!(parent_dir("/etc"), Some("/"));
        assert_eq!(parent_dir("/etc/ssh/"), Some("/etc"));
        assert_eq!(parent_dir("relative"), None);
    }
}
