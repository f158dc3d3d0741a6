//! Differ: classify every path of two snapshots as added, modified, deleted,
//! or unchanged.
//!
//! Equal root digests short-circuit to an empty result unless a full
//! comparison is forced. Otherwise both record maps are walked in parallel
//! and the outcome is collected into path-sorted maps.

pub mod changes;
pub mod critical;
pub mod result;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use fsdiff_core::config::DiffConfig;
use fsdiff_core::events::{DiffCompleteEvent, EventDispatcher};
use fsdiff_core::types::{FileRecord, Snapshot};
use rayon::prelude::*;

pub use changes::{describe_changes, records_equal};
pub use critical::{CriticalChange, CRITICAL_PATHS};
pub use result::{ChangeDetail, ChangeKind, DiffResult, DiffSummary, ExportRow};

use crate::filter::PathFilter;

enum Classified<'a> {
    Ignored,
    Added(&'a str, &'a FileRecord),
    Modified(&'a str, ChangeDetail<'a>),
    Deleted(&'a str, &'a FileRecord),
}

#[derive(Debug, Clone, Default)]
pub struct Differ {
    config: DiffConfig,
    events: EventDispatcher,
}

impl Differ {
    pub fn new(config: DiffConfig) -> Self {
        Self {
            config,
            events: EventDispatcher::new(),
        }
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    pub fn compare<'a>(&self, baseline: &'a Snapshot, current: &'a Snapshot) -> DiffResult<'a> {
        let started = Instant::now();

        let digests_match =
            !baseline.root_digest.is_empty() && baseline.root_digest == current.root_digest;
        if digests_match && !self.config.effective_force_full_compare() {
            tracing::debug!(root_digest = %baseline.root_digest, "root digests match; skipping record comparison");
            let mut result = DiffResult::assemble(
                baseline,
                current,
                BTreeMap::new(),
                BTreeMap::new(),
                BTreeMap::new(),
            );
            result.summary.fast_path = true;
            result.summary.comparison_time = started.elapsed();
            self.finish(&result);
            return result;
        }

        let filter = PathFilter::for_root(
            Path::new(&baseline.system_info.scan_root),
            &self.config.ignore_patterns,
        );
        let show_hashes = self.config.effective_show_hashes();

        let from_baseline: Vec<Classified<'a>> = baseline
            .files
            .par_iter()
            .filter_map(|(path, old)| {
                if filter.should_ignore(path) {
                    return Some(Classified::Ignored);
                }
                match current.files.get(path) {
                    None => Some(Classified::Deleted(path.as_str(), old)),
                    Some(new) if records_equal(old, new) => None,
                    Some(new) => Some(Classified::Modified(
                        path.as_str(),
                        ChangeDetail {
                            old,
                            new,
                            changes: describe_changes(old, new, show_hashes),
                        },
                    )),
                }
            })
            .collect();

        let from_current: Vec<Classified<'a>> = current
            .files
            .par_iter()
            .filter(|(path, _)| !baseline.files.contains_key(*path))
            .map(|(path, new)| {
                if filter.should_ignore(path) {
                    Classified::Ignored
                } else {
                    Classified::Added(path.as_str(), new)
                }
            })
            .collect();

        let mut added = BTreeMap::new();
        let mut modified = BTreeMap::new();
        let mut deleted = BTreeMap::new();
        let mut ignored = 0usize;
        for entry in from_baseline.into_iter().chain(from_current) {
            match entry {
                Classified::Ignored => ignored += 1,
                Classified::Added(path, record) => {
                    added.insert(path, record);
                }
                Classified::Modified(path, detail) => {
                    modified.insert(path, detail);
                }
                Classified::Deleted(path, record) => {
                    deleted.insert(path, record);
                }
            }
        }

        let mut result = DiffResult::assemble(baseline, current, added, modified, deleted);
        result.summary.ignored_paths = ignored;
        result.summary.comparison_time = started.elapsed();
        self.finish(&result);
        result
    }

    fn finish(&self, result: &DiffResult<'_>) {
        let summary = &result.summary;
        tracing::info!(
            added = summary.added_count,
            modified = summary.modified_count,
            deleted = summary.deleted_count,
            critical = result.critical_changes().len(),
            ignored = summary.ignored_paths,
            fast_path = summary.fast_path,
            elapsed_ms = summary.comparison_time.as_millis() as u64,
            "comparison complete"
        );
        if self.config.effective_verbose() {
            for change in result.critical_changes() {
                tracing::info!(
                    path = change.path,
                    severity = change.severity,
                    reason = %change.reason,
                    "critical change"
                );
            }
        }
        self.events.emit_diff_complete(&DiffCompleteEvent {
            added: summary.added_count,
            modified: summary.modified_count,
            deleted: summary.deleted_count,
            critical: result.critical_changes().len(),
            fast_path: summary.fast_path,
            duration: summary.comparison_time,
        });
    }
}

/// Compare two snapshots with `config` and no event handlers.
pub fn compare<'a>(baseline: &'a Snapshot, current: &'a Snapshot, config: &DiffConfig) -> DiffResult<'a> {
    Differ::new(config.clone()).compare(baseline, current)
}
