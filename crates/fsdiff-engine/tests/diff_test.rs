//! Differ integration tests: on-disk scenarios and synthetic snapshots.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fsdiff_core::config::{DiffConfig, ScanConfig};
use fsdiff_core::events::{DiffCompleteEvent, EventDispatcher, ScanEventHandler};
use fsdiff_core::types::{FileRecord, Snapshot, SystemInfo};
use fsdiff_engine::{compare, ChangeKind, Differ, Scanner};
use tempfile::TempDir;

fn scanner() -> Scanner {
    Scanner::new(ScanConfig {
        workers: Some(2),
        ..ScanConfig::default()
    })
}

fn key(root: &Path, rel: &str) -> String {
    root.join(rel).to_string_lossy().into_owned()
}

fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
    std::fs::create_dir(dir.path().join("b")).unwrap();
    std::fs::write(dir.path().join("b/c.txt"), "yo").unwrap();
    dir
}

fn file(path: &str, digest: &str, size: u64) -> FileRecord {
    FileRecord {
        path: path.to_string(),
        content_digest: digest.to_string(),
        size,
        mode: 0o100_644,
        mod_time: DateTime::<Utc>::UNIX_EPOCH,
        is_dir: false,
        owner_id: 0,
        group_id: 0,
        security_metadata: None,
    }
}

fn dir(path: &str) -> FileRecord {
    FileRecord {
        path: path.to_string(),
        content_digest: String::new(),
        size: 4096,
        mode: 0o040_755,
        mod_time: DateTime::<Utc>::UNIX_EPOCH,
        is_dir: true,
        owner_id: 0,
        group_id: 0,
        security_metadata: None,
    }
}

fn snapshot(records: Vec<FileRecord>) -> Snapshot {
    Snapshot::from_records(SystemInfo::for_root("/"), records)
}

#[test]
fn test_content_change_same_size() {
    let tree = sample_tree();
    let root = tree.path();
    let before = scanner().scan(root).unwrap();
    std::fs::write(root.join("a.txt"), "ho").unwrap();
    let after = scanner().scan(root).unwrap();

    let result = compare(&before, &after, &DiffConfig::default());
    let a = key(root, "a.txt");
    let detail = result.modified.get(a.as_str()).unwrap();
    assert!(detail.changes.iter().any(|c| c == "content"));
    assert!(result.added.is_empty());
    assert!(result.deleted.is_empty());
    assert_eq!(result.summary.modified_count, 1);
    assert!(!result.summary.fast_path);
}

#[test]
fn test_deleted_file_reported() {
    let tree = sample_tree();
    let root = tree.path();
    let before = scanner().scan(root).unwrap();
    std::fs::remove_file(root.join("b/c.txt")).unwrap();
    let after = scanner().scan(root).unwrap();

    let result = compare(&before, &after, &DiffConfig::default());
    assert!(result.deleted.contains_key(key(root, "b/c.txt").as_str()));
    assert_eq!(result.summary.deleted_count, 1);
    assert_eq!(result.summary.deleted_size, 2);
    assert!(result.added.is_empty());
}

#[test]
fn test_added_shadow_file_is_critical() {
    let baseline = snapshot(vec![dir("/"), dir("/etc"), file("/etc/passwd", "aa", 10)]);
    let current = snapshot(vec![
        dir("/"),
        dir("/etc"),
        file("/etc/passwd", "aa", 10),
        file("/etc/shadow", "bb", 20),
    ]);

    let result = compare(&baseline, &current, &DiffConfig::default());
    assert_eq!(result.changes_by_type(ChangeKind::Added), vec!["/etc/shadow"]);
    let critical = result.critical_changes();
    let shadow = critical.iter().find(|c| c.path == "/etc/shadow").unwrap();
    assert!(shadow.severity >= 8);
    assert!(shadow.reason.to_lowercase().contains("password"));
    assert_eq!(shadow.change, ChangeKind::Added);
}

#[test]
fn test_force_full_compare_bypasses_stale_digest() {
    let baseline = snapshot(vec![dir("/srv"), file("/srv/app.bin", "aa", 8)]);
    let mut current = snapshot(vec![dir("/srv"), file("/srv/app.bin", "ff", 8)]);
    current.root_digest = baseline.root_digest;

    let quick = compare(&baseline, &current, &DiffConfig::default());
    assert!(quick.summary.fast_path);
    assert!(quick.is_empty());

    let full = compare(
        &baseline,
        &current,
        &DiffConfig {
            force_full_compare: Some(true),
            ..DiffConfig::default()
        },
    );
    assert!(!full.summary.fast_path);
    assert_eq!(full.changes_by_type(ChangeKind::Modified), vec!["/srv/app.bin"]);
}

#[test]
fn test_self_compare_takes_fast_path() {
    let snap = snapshot(vec![dir("/srv"), file("/srv/a", "aa", 1)]);
    let result = compare(&snap, &snap, &DiffConfig::default());
    assert!(result.summary.fast_path);
    assert!(result.is_empty());
    assert!(result.critical_changes().is_empty());
}

#[test]
fn test_ignored_paths_are_skipped() {
    let baseline = snapshot(vec![dir("/srv"), file("/srv/app.log", "aa", 1)]);
    let current = snapshot(vec![
        dir("/srv"),
        file("/srv/app.log", "bb", 1),
        file("/srv/new.log", "cc", 1),
        file("/srv/new.txt", "dd", 1),
    ]);
    let config = DiffConfig {
        ignore_patterns: vec!["*.log".to_string()],
        ..DiffConfig::default()
    };

    let result = compare(&baseline, &current, &config);
    assert_eq!(result.changes_by_type(ChangeKind::Added), vec!["/srv/new.txt"]);
    assert!(result.modified.is_empty());
    assert_eq!(result.summary.ignored_paths, 2);
}

#[test]
fn test_summary_sizes_and_delta() {
    let baseline = snapshot(vec![
        dir("/d"),
        file("/d/keep", "aa", 100),
        file("/d/gone", "bb", 40),
    ]);
    let current = snapshot(vec![
        dir("/d"),
        file("/d/keep", "ab", 130),
        file("/d/new", "cc", 5),
    ]);

    let result = compare(&baseline, &current, &DiffConfig::default());
    assert_eq!(result.summary.added_size, 5);
    assert_eq!(result.summary.deleted_size, 40);
    assert_eq!(result.summary.size_delta, 5 - 40 + 30);
    assert_eq!(result.summary.total_changes, 3);
}

#[test]
fn test_filter_changes_and_export_rows() {
    let baseline = snapshot(vec![
        dir("/"),
        file("/etc/hosts", "aa", 10),
        file("/opt/tool", "bb", 10),
    ]);
    let current = snapshot(vec![
        dir("/"),
        file("/etc/hosts", "ab", 11),
        file("/opt/extra", "cc", 3),
    ]);
    let result = compare(&baseline, &current, &DiffConfig::default());

    let rows = result.export_rows();
    let paths: Vec<&str> = rows.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/etc/hosts", "/opt/extra", "/opt/tool"]);
    assert_eq!(rows[0].change_type, ChangeKind::Modified);
    assert_eq!(rows[0].changes, "content; size (10 → 11)");
    assert_eq!(rows[0].mode, "-rw-r--r--");
    assert_eq!(rows[2].change_type, ChangeKind::Deleted);
    assert_eq!(rows[2].digest, "bb");

    let only_etc = result.filter_changes(|path, _| path.starts_with("/etc/"));
    assert_eq!(only_etc.summary.total_changes, 1);
    assert_eq!(only_etc.summary.added_size, 0);
    assert_eq!(only_etc.critical_changes().len(), 1);
    assert_eq!(result.summary.total_changes, 3);

    let grouped = result.grouped_changes();
    assert_eq!(grouped.len(), 3);
    assert_eq!(grouped[&ChangeKind::Deleted], vec!["/opt/tool"]);
}

#[test]
fn test_result_serializes_to_json() {
    let baseline = snapshot(vec![dir("/"), file("/etc/shadow", "aa", 1)]);
    let current = snapshot(vec![dir("/")]);
    let result = compare(&baseline, &current, &DiffConfig::default());

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["deleted"]["/etc/shadow"].is_object());
    assert_eq!(json["summary"]["deleted_count"], 1);
    assert_eq!(json["critical_changes"][0]["change"], "deleted");
    assert_eq!(json["critical_changes"][0]["severity"], 8);
}

#[derive(Default)]
struct DiffCounter {
    calls: AtomicUsize,
    fast: AtomicUsize,
}

impl ScanEventHandler for DiffCounter {
    fn on_diff_complete(&self, event: &DiffCompleteEvent) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if event.fast_path {
            self.fast.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn test_diff_emits_completion_event() {
    let counter = Arc::new(DiffCounter::default());
    let mut events = EventDispatcher::new();
    events.register(counter.clone());
    let differ = Differ::new(DiffConfig::default()).with_events(events);

    let a = snapshot(vec![dir("/x")]);
    let b = snapshot(vec![dir("/x"), file("/x/f", "aa", 1)]);
    differ.compare(&a, &a);
    differ.compare(&a, &b);

    assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
    assert_eq!(counter.fast.load(Ordering::SeqCst), 1);
}
