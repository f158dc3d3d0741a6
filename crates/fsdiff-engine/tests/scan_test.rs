//! Scanner integration tests over small on-disk trees.

use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fsdiff_core::config::{ScanConfig, StorageConfig};
use fsdiff_core::errors::ScanError;
use fsdiff_core::events::{EventDispatcher, ScanCompleteEvent, ScanEventHandler, ScanStartedEvent};
use fsdiff_core::traits::{Cancellable, CancellationToken, FileMetadataProvider, PlatformFileInfo};
use fsdiff_engine::hasher::hash_bytes;
use fsdiff_engine::platform::StatMetadataProvider;
use fsdiff_engine::Scanner;
use tempfile::TempDir;

fn config(workers: usize) -> ScanConfig {
    ScanConfig {
        workers: Some(workers),
        ..ScanConfig::default()
    }
}

fn key(root: &Path, rel: &str) -> String {
    root.join(rel).to_string_lossy().into_owned()
}

/// `a.txt` = "hi", `b/c.txt` = "yo".
fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
    std::fs::create_dir(dir.path().join("b")).unwrap();
    std::fs::write(dir.path().join("b/c.txt"), "yo").unwrap();
    dir
}

#[test]
fn test_scan_small_tree() {
    let tree = sample_tree();
    let root = tree.path();
    let snapshot = Scanner::new(config(2)).scan(root).unwrap();

    assert_eq!(snapshot.stats.file_count, 2);
    // Two directories: the scan root is recorded as a directory entry
    // alongside `b`.
    assert_eq!(snapshot.stats.dir_count, 2);
    assert_eq!(snapshot.stats.total_size, 4);
    assert_eq!(snapshot.stats.error_count, 0);

    let a = snapshot.get(&key(root, "a.txt")).unwrap();
    let c = snapshot.get(&key(root, "b/c.txt")).unwrap();
    assert_eq!(a.size, 2);
    assert_eq!(c.size, 2);
    assert_eq!(a.content_digest, hash_bytes(b"hi"));
    assert_eq!(c.content_digest, hash_bytes(b"yo"));
    assert!(snapshot.get(&key(root, "b")).unwrap().is_dir);
    assert!(snapshot.get(&root.to_string_lossy()).unwrap().is_dir);

    assert!(snapshot.verify_root_digest());
    assert!(snapshot.validate().is_ok());
    assert_eq!(snapshot.system_info.scan_root, root.display().to_string());
}

#[test]
fn test_scan_is_deterministic_across_worker_counts() {
    let tree = sample_tree();
    for i in 0..30 {
        std::fs::write(tree.path().join(format!("b/f{i}.bin")), vec![i as u8; i * 100]).unwrap();
    }
    let single = Scanner::new(config(1)).scan(tree.path()).unwrap();
    let many = Scanner::new(config(8)).scan(tree.path()).unwrap();

    assert_eq!(single.root_digest, many.root_digest);
    assert_eq!(single.stats.file_count, many.stats.file_count);
    assert_eq!(single.stats.dir_count, many.stats.dir_count);
    assert_eq!(single.files, many.files);
}

#[test]
fn test_empty_tree_counts_root_only() {
    let dir = TempDir::new().unwrap();
    let snapshot = Scanner::new(config(2)).scan(dir.path()).unwrap();
    assert_eq!(snapshot.stats.file_count, 0);
    assert_eq!(snapshot.stats.dir_count, 1);
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn test_ignored_directory_prunes_subtree() {
    let tree = sample_tree();
    let root = tree.path();
    std::fs::create_dir_all(root.join("skip/deep")).unwrap();
    std::fs::write(root.join("skip/deep/x.txt"), "x").unwrap();
    std::fs::create_dir(root.join(".git")).unwrap();
    std::fs::write(root.join(".git/HEAD"), "ref").unwrap();
    std::fs::write(root.join("trace.log"), "noise").unwrap();

    let cfg = ScanConfig {
        ignore_patterns: vec!["skip".to_string(), "*.log".to_string()],
        ..config(2)
    };
    let snapshot = Scanner::new(cfg).scan(root).unwrap();

    assert!(snapshot.get(&key(root, "skip")).is_none());
    assert!(snapshot.get(&key(root, "skip/deep/x.txt")).is_none());
    assert!(snapshot.get(&key(root, ".git")).is_none());
    assert!(snapshot.get(&key(root, "trace.log")).is_none());
    assert_eq!(snapshot.stats.file_count, 2);
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = Scanner::new(config(1))
        .scan(&dir.path().join("absent"))
        .unwrap_err();
    assert!(matches!(err, ScanError::RootUnreadable { .. }));
}

#[test]
fn test_file_root_is_rejected() {
    let tree = sample_tree();
    let err = Scanner::new(config(1))
        .scan(&tree.path().join("a.txt"))
        .unwrap_err();
    assert!(matches!(err, ScanError::RootNotDirectory { .. }));
}

#[test]
fn test_cancelled_scan_returns_partial_error() {
    let tree = sample_tree();
    let token = CancellationToken::new();
    token.cancel();
    let err = Scanner::new(config(2))
        .with_cancellation(token)
        .scan(tree.path())
        .unwrap_err();
    assert!(matches!(err, ScanError::Cancelled { .. }));
}

#[test]
fn test_cancelled_streaming_scan_removes_output() {
    let tree = sample_tree();
    let out_dir = TempDir::new().unwrap();
    let output = out_dir.path().join("snap.fsd");
    let scanner = Scanner::new(config(2));
    scanner.cancellation_token().cancel();

    let err = scanner
        .scan_to_file(tree.path(), &output, &StorageConfig::default())
        .unwrap_err();
    assert!(matches!(err, ScanError::Cancelled { .. }));
    assert!(!output.exists());
}

#[test]
fn test_streaming_scan_matches_in_memory_scan() {
    let tree = sample_tree();
    for i in 0..25 {
        std::fs::write(tree.path().join(format!("f{i}.txt")), format!("file {i}")).unwrap();
    }
    let out_dir = TempDir::new().unwrap();
    let output = out_dir.path().join("snap.fsd");
    let storage = StorageConfig {
        batch_size: Some(7),
        ..StorageConfig::default()
    };

    let scanner = Scanner::new(config(4));
    let in_memory = scanner.scan(tree.path()).unwrap();
    let summary = scanner.scan_to_file(tree.path(), &output, &storage).unwrap();

    assert_eq!(summary.root_digest, in_memory.root_digest);
    assert_eq!(summary.stats.file_count, in_memory.stats.file_count);
    assert_eq!(summary.stats.dir_count, in_memory.stats.dir_count);
    assert!(summary.batches >= 4);

    let loaded = fsdiff_storage::load(&output).unwrap();
    assert_eq!(loaded.files, in_memory.files);
    assert_eq!(loaded.root_digest, in_memory.root_digest);
    let header = fsdiff_storage::load_header(&output).unwrap();
    assert_eq!(header.stats.file_count, in_memory.stats.file_count);
}

#[test]
fn test_missing_root_creates_no_output() {
    let out_dir = TempDir::new().unwrap();
    let output = out_dir.path().join("snap.fsd");
    let err = Scanner::new(config(1))
        .scan_to_file(&out_dir.path().join("absent"), &output, &StorageConfig::default())
        .unwrap_err();
    assert!(matches!(err, ScanError::RootUnreadable { .. }));
    assert!(!output.exists());
}

#[derive(Default)]
struct Recorder {
    started_workers: AtomicUsize,
    completes: AtomicUsize,
    completed_files: AtomicU64,
}

impl ScanEventHandler for Recorder {
    fn on_scan_started(&self, event: &ScanStartedEvent) {
        self.started_workers.store(event.workers, Ordering::SeqCst);
    }

    fn on_scan_complete(&self, event: &ScanCompleteEvent) {
        self.completes.fetch_add(1, Ordering::SeqCst);
        self.completed_files.store(event.file_count, Ordering::SeqCst);
    }
}

#[test]
fn test_scan_emits_lifecycle_events() {
    let tree = sample_tree();
    let recorder = Arc::new(Recorder::default());
    let mut events = EventDispatcher::new();
    events.register(recorder.clone());

    Scanner::new(config(3))
        .with_events(events)
        .scan(tree.path())
        .unwrap();

    assert_eq!(recorder.started_workers.load(Ordering::SeqCst), 3);
    assert_eq!(recorder.completes.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.completed_files.load(Ordering::SeqCst), 2);
}

#[cfg(unix)]
#[test]
fn test_symlink_recorded_without_digest() {
    let tree = sample_tree();
    let link = tree.path().join("link");
    std::os::unix::fs::symlink(tree.path().join("a.txt"), &link).unwrap();

    let snapshot = Scanner::new(config(2)).scan(tree.path()).unwrap();
    let record = snapshot.get(&link.to_string_lossy()).unwrap();
    assert!(record.is_symlink());
    assert!(record.content_digest.is_empty());
    assert_eq!(snapshot.stats.file_count, 3);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_soft_error() {
    use std::os::unix::fs::PermissionsExt;

    // Root reads everything regardless of mode bits.
    if unsafe { libc::geteuid() } == 0 {
        return;
    }
    let tree = sample_tree();
    let locked = tree.path().join("locked.txt");
    std::fs::write(&locked, "secret").unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

    let snapshot = Scanner::new(config(2)).scan(tree.path()).unwrap();
    let record = snapshot.get(&locked.to_string_lossy()).unwrap();
    assert!(record.hash_failed());
    assert_eq!(snapshot.stats.error_count, 1);
    assert_eq!(snapshot.stats.file_count, 3);
}

/// Stalls every metadata lookup so the single worker falls behind the walker.
struct SlowProvider;

impl FileMetadataProvider for SlowProvider {
    fn get_info(&self, path: &Path, metadata: &std::fs::Metadata) -> PlatformFileInfo {
        std::thread::sleep(Duration::from_millis(200));
        StatMetadataProvider.get_info(path, metadata)
    }
}

#[test]
fn test_saturated_workers_skip_paths_as_soft_errors() {
    let tree = TempDir::new().unwrap();
    for i in 0..30 {
        std::fs::write(tree.path().join(format!("f{i:02}.txt")), "x").unwrap();
    }
    let on_disk = 31;

    let config = ScanConfig {
        workers: Some(1),
        dispatch_timeout_ms: Some(10),
        ..ScanConfig::default()
    };
    let snapshot = Scanner::new(config)
        .with_metadata_provider(Arc::new(SlowProvider))
        .scan(tree.path())
        .unwrap();

    assert!(snapshot.stats.error_count > 0);
    assert_eq!(snapshot.len() as u64 + snapshot.stats.error_count, on_disk);
    assert!(snapshot.get(&tree.path().to_string_lossy()).unwrap().is_dir);
    assert!(snapshot.verify_root_digest());
}
