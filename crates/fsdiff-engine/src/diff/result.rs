//! Diff result and its tabular export view.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::SecondsFormat;
use fsdiff_core::types::collections::SmallVec4;
use fsdiff_core::types::serde_helpers::duration_millis;
use fsdiff_core::types::{FileRecord, Snapshot};
use serde::{Deserialize, Serialize};

use super::critical::{self, CriticalChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 3] = [Self::Added, Self::Modified, Self::Deleted];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path present in both snapshots whose records differ.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeDetail<'a> {
    pub old: &'a FileRecord,
    pub new: &'a FileRecord,
    /// Never empty.
    pub changes: SmallVec4<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffSummary {
    pub added_count: usize,
    pub modified_count: usize,
    pub deleted_count: usize,
    pub total_changes: usize,
    /// Sum of added non-directory sizes.
    pub added_size: u64,
    /// Sum of deleted non-directory sizes.
    pub deleted_size: u64,
    /// Net byte change across added, deleted, and modified files.
    pub size_delta: i64,
    #[serde(with = "duration_millis")]
    pub comparison_time: Duration,
    /// Root digests matched and records were not compared.
    pub fast_path: bool,
    /// Paths excluded by the filter.
    pub ignored_paths: usize,
}

/// Flat row for CSV and other tabular renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub path: String,
    pub change_type: ChangeKind,
    pub size: u64,
    pub mode: String,
    pub mod_time: String,
    pub digest: String,
    pub changes: String,
}

impl ExportRow {
    pub const HEADERS: [&'static str; 7] =
        ["path", "change_type", "size", "mode", "mod_time", "digest", "changes"];

    fn new(path: &str, change_type: ChangeKind, record: &FileRecord, changes: String) -> Self {
        Self {
            path: path.to_string(),
            change_type,
            size: record.size,
            mode: record.mode_string(),
            mod_time: record.mod_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            digest: record.content_digest.clone(),
            changes,
        }
    }

    pub fn fields(&self) -> [String; 7] {
        [
            self.path.clone(),
            self.change_type.to_string(),
            self.size.to_string(),
            self.mode.clone(),
            self.mod_time.clone(),
            self.digest.clone(),
            self.changes.clone(),
        ]
    }
}

/// Outcome of comparing a baseline snapshot with a current one. Borrows
/// both snapshots; the caller keeps them alive.
#[derive(Debug, Clone, Serialize)]
pub struct DiffResult<'a> {
    #[serde(skip)]
    pub baseline: &'a Snapshot,
    #[serde(skip)]
    pub current: &'a Snapshot,
    pub added: BTreeMap<&'a str, &'a FileRecord>,
    pub modified: BTreeMap<&'a str, ChangeDetail<'a>>,
    pub deleted: BTreeMap<&'a str, &'a FileRecord>,
    pub summary: DiffSummary,
    #[serde(rename = "critical_changes")]
    critical: Vec<CriticalChange<'a>>,
}

impl<'a> DiffResult<'a> {
    pub(crate) fn assemble(
        baseline: &'a Snapshot,
        current: &'a Snapshot,
        added: BTreeMap<&'a str, &'a FileRecord>,
        modified: BTreeMap<&'a str, ChangeDetail<'a>>,
        deleted: BTreeMap<&'a str, &'a FileRecord>,
    ) -> Self {
        let mut result = Self {
            baseline,
            current,
            added,
            modified,
            deleted,
            summary: DiffSummary::default(),
            critical: Vec::new(),
        };
        result.refresh();
        result
    }

    /// Recompute summary counts and critical changes from the three maps.
    /// Timing, fast-path, and ignored counts are left as they are.
    fn refresh(&mut self) {
        let added_size: u64 = self.added.values().filter(|r| !r.is_dir).map(|r| r.size).sum();
        let deleted_size: u64 = self.deleted.values().filter(|r| !r.is_dir).map(|r| r.size).sum();
        let modified_delta: i64 = self
            .modified
            .values()
            .filter(|d| !d.new.is_dir)
            .map(|d| d.new.size as i64 - d.old.size as i64)
            .sum();

        self.summary.added_count = self.added.len();
        self.summary.modified_count = self.modified.len();
        self.summary.deleted_count = self.deleted.len();
        self.summary.total_changes = self.added.len() + self.modified.len() + self.deleted.len();
        self.summary.added_size = added_size;
        self.summary.deleted_size = deleted_size;
        self.summary.size_delta = added_size as i64 - deleted_size as i64 + modified_delta;

        let candidates = self
            .added
            .iter()
            .map(|(path, record)| (*path, ChangeKind::Added, *record))
            .chain(
                self.modified
                    .iter()
                    .map(|(path, detail)| (*path, ChangeKind::Modified, detail.new)),
            )
            .chain(
                self.deleted
                    .iter()
                    .map(|(path, record)| (*path, ChangeKind::Deleted, *record)),
            );
        self.critical = critical::detect(candidates);
    }

    pub fn is_empty(&self) -> bool {
        self.summary.total_changes == 0
    }

    /// Security-sensitive changes, most severe first.
    pub fn critical_changes(&self) -> &[CriticalChange<'a>] {
        &self.critical
    }

    /// Sorted paths of one change kind.
    pub fn changes_by_type(&self, kind: ChangeKind) -> Vec<&'a str> {
        match kind {
            ChangeKind::Added => self.added.keys().copied().collect(),
            ChangeKind::Modified => self.modified.keys().copied().collect(),
            ChangeKind::Deleted => self.deleted.keys().copied().collect(),
        }
    }

    /// Every change kind with its sorted paths; kinds without changes are
    /// omitted.
    pub fn grouped_changes(&self) -> BTreeMap<ChangeKind, Vec<&'a str>> {
        ChangeKind::ALL
            .into_iter()
            .map(|kind| (kind, self.changes_by_type(kind)))
            .filter(|(_, paths)| !paths.is_empty())
            .collect()
    }

    /// A new result keeping only changes accepted by `keep`, with summary
    /// and critical changes recomputed.
    pub fn filter_changes<F>(&self, keep: F) -> DiffResult<'a>
    where
        F: Fn(&str, ChangeKind) -> bool,
    {
        let mut filtered = Self {
            baseline: self.baseline,
            current: self.current,
            added: self
                .added
                .iter()
                .filter(|(path, _)| keep(path, ChangeKind::Added))
                .map(|(path, record)| (*path, *record))
                .collect(),
            modified: self
                .modified
                .iter()
                .filter(|(path, _)| keep(path, ChangeKind::Modified))
                .map(|(path, detail)| (*path, detail.clone()))
                .collect(),
            deleted: self
                .deleted
                .iter()
                .filter(|(path, _)| keep(path, ChangeKind::Deleted))
                .map(|(path, record)| (*path, *record))
                .collect(),
            summary: self.summary.clone(),
            critical: Vec::new(),
        };
        filtered.refresh();
        filtered
    }

    /// One row per change, sorted by path. Deletions report the baseline
    /// record; additions and modifications the current one.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        let mut rows: Vec<ExportRow> = Vec::with_capacity(self.summary.total_changes);
        rows.extend(
            self.added
                .iter()
                .map(|(path, record)| ExportRow::new(path, ChangeKind::Added, record, String::new())),
        );
        rows.extend(self.modified.iter().map(|(path, detail)| {
            ExportRow::new(path, ChangeKind::Modified, detail.new, detail.changes.join("; "))
        }));
        rows.extend(
            self.deleted
                .iter()
                .map(|(path, record)| ExportRow::new(path, ChangeKind::Deleted, record, String::new())),
        );
        rows.sort_by(|a, b| a.path.cmp(&b.path).then(a.change_type.cmp(&b.change_type)));
        rows
    }
}
