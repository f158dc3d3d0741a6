//! SnapshotStore round-trip, header, and corruption tests.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use fsdiff_core::config::StorageConfig;
use fsdiff_core::errors::StorageError;
use fsdiff_core::types::{FileRecord, Snapshot, SystemInfo};
use fsdiff_core::RootDigest;
use fsdiff_storage::{load, load_header, save, SnapshotStore, SnapshotWriter};
use tempfile::TempDir;

fn mtime(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 123_456_789).single().unwrap()
}

fn file(path: &str, digest: &str, size: u64) -> FileRecord {
    FileRecord {
        path: path.to_string(),
        content_digest: digest.to_string(),
        size,
        mode: 0o100_644,
        mod_time: mtime(1_700_000_000),
        is_dir: false,
        owner_id: 1000,
        group_id: 1000,
        security_metadata: None,
    }
}

fn dir(path: &str) -> FileRecord {
    FileRecord {
        path: path.to_string(),
        content_digest: String::new(),
        size: 4096,
        mode: 0o040_755,
        mod_time: mtime(1_700_000_100),
        is_dir: true,
        owner_id: 0,
        group_id: 0,
        security_metadata: None,
    }
}

fn sample_snapshot(extra_files: usize) -> Snapshot {
    let mut records = vec![
        dir("/r"),
        dir("/r/b"),
        file("/r/a.txt", "00aa", 2),
        file("/r/b/c.txt", "00cc", 2),
    ];
    for i in 0..extra_files {
        records.push(file(&format!("/r/b/f{i:04}.bin"), &format!("{i:016x}"), i as u64));
    }
    let mut snapshot = Snapshot::from_records(SystemInfo::for_root("/r"), records);
    snapshot.stats.error_count = 1;
    snapshot.stats.scan_duration = Duration::from_millis(1500);
    snapshot
}

fn write_raw_container(path: &Path, lines: &[String]) {
    let mut body = String::new();
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }
    let compressed = zstd::encode_all(body.as_bytes(), 3).unwrap();
    std::fs::File::create(path)
        .unwrap()
        .write_all(&compressed)
        .unwrap();
}

#[test]
fn round_trip_preserves_records_and_root() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.fsd");
    let original = sample_snapshot(25);

    let summary = save(&original, &path).unwrap();
    assert_eq!(summary.root_digest, original.root_digest);
    assert!(summary.compressed_bytes > 0);

    let loaded = load(&path).unwrap();
    assert_eq!(loaded.files, original.files);
    assert_eq!(loaded.root_digest, original.root_digest);
    assert_eq!(loaded.stats, original.stats);
    assert_eq!(loaded.system_info, original.system_info);
    assert!(loaded.verify_root_digest());

    let tree = loaded.tree.as_ref().expect("tree rebuilt on load");
    assert_eq!(tree.leaf_count(), original.files.len());
    assert!(tree.verify_integrity());
}

#[test]
fn small_batches_split_into_many_frames() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.fsd");
    let store = SnapshotStore::new(StorageConfig {
        batch_size: Some(3),
        flush_every_batches: Some(2),
        ..Default::default()
    });
    let original = sample_snapshot(20);

    let summary = store.save(&original, &path).unwrap();
    assert_eq!(summary.batches, original.files.len().div_ceil(3));

    let loaded = store.load(&path).unwrap();
    assert_eq!(loaded.files.len(), original.files.len());
    assert_eq!(loaded.root_digest, original.root_digest);
}

#[test]
fn save_stamps_current_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.fsd");
    let mut original = sample_snapshot(0);
    original.format_version = "2.0.0-rc1".to_string();

    save(&original, &path).unwrap();
    assert_eq!(load(&path).unwrap().format_version, fsdiff_core::constants::FORMAT_VERSION);
}

#[test]
fn header_read_matches_full_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.fsd");
    let original = sample_snapshot(10);
    save(&original, &path).unwrap();

    let header = load_header(&path).unwrap();
    assert_eq!(header.stats, original.stats);
    assert_eq!(header.root_digest, original.root_digest);
    assert_eq!(header.system_info.scan_root, "/r");
}

#[test]
fn streaming_writer_header_comes_from_trailer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stream.fsd");
    let config = StorageConfig {
        batch_size: Some(4),
        ..Default::default()
    };
    let info = SystemInfo::for_root("/r");
    let mut writer = SnapshotWriter::create(&path, &info, &config).unwrap();
    let source = sample_snapshot(9);
    for record in source.files.values() {
        writer.push(record.clone()).unwrap();
    }
    assert_eq!(writer.records_written(), source.len() as u64);
    assert_eq!(writer.root_digest(), source.root_digest);
    let summary = writer.finish(2, Duration::from_secs(3)).unwrap();
    assert_eq!(summary.root_digest, source.root_digest);
    assert_eq!(summary.stats.file_count, source.stats.file_count);
    assert_eq!(summary.stats.dir_count, source.stats.dir_count);

    let header = load_header(&path).unwrap();
    assert_eq!(header.root_digest, source.root_digest);
    assert_eq!(header.stats.error_count, 2);
    assert_eq!(header.stats.scan_duration, Duration::from_secs(3));

    let loaded = load(&path).unwrap();
    assert_eq!(loaded.files, source.files);
}

#[test]
fn empty_streaming_snapshot_has_zero_root() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.fsd");
    let writer =
        SnapshotWriter::create(&path, &SystemInfo::for_root("/e"), &StorageConfig::default())
            .unwrap();
    let summary = writer.finish(0, Duration::ZERO).unwrap();
    assert_eq!(summary.root_digest, RootDigest::EMPTY);
    assert_eq!(summary.batches, 0);

    let loaded = load(&path).unwrap();
    assert!(loaded.files.is_empty());
    assert!(loaded.tree.as_ref().is_some_and(|t| t.is_empty()));
}

#[test]
fn stale_root_digest_is_kept_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stale.fsd");
    let mut original = sample_snapshot(3);
    original.root_digest = RootDigest(0xdead_beef);

    save(&original, &path).unwrap();
    let loaded = load(&path).unwrap();
    assert_eq!(loaded.root_digest, RootDigest(0xdead_beef));
    assert!(!loaded.verify_root_digest());
    assert_eq!(loaded.files, original.files);
}

#[test]
fn missing_trailer_is_truncated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cut.fsd");
    let info = serde_json::to_string(&SystemInfo::for_root("/r")).unwrap();
    let record = serde_json::to_string(&file("/r/a", "01", 1)).unwrap();
    write_raw_container(
        &path,
        &[
            format!(
                r#"{{"frame":"header","format_version":"2.0.0","system_info":{info},"created":"2024-01-01T00:00:00Z","streaming":true}}"#
            ),
            format!(r#"{{"frame":"batch","records":[{record}]}}"#),
        ],
    );

    assert!(matches!(load(&path), Err(StorageError::Truncated { .. })));
    assert!(matches!(load_header(&path), Err(StorageError::Truncated { .. })));
}

#[test]
fn future_major_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.fsd");
    let info = serde_json::to_string(&SystemInfo::for_root("/r")).unwrap();
    write_raw_container(
        &path,
        &[format!(
            r#"{{"frame":"header","format_version":"3.0.0","system_info":{info},"created":"2024-01-01T00:00:00Z","streaming":false}}"#
        )],
    );
    assert!(matches!(
        load(&path),
        Err(StorageError::UnsupportedVersion { .. })
    ));
}

#[test]
fn stream_without_header_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("headless.fsd");
    write_raw_container(&path, &[r#"{"frame":"batch","records":[]}"#.to_string()]);
    assert!(matches!(load(&path), Err(StorageError::MissingHeader)));
}

#[test]
fn missing_file_is_an_open_error() {
    let dir = TempDir::new().unwrap();
    let err = load(&dir.path().join("absent.fsd")).unwrap_err();
    assert!(matches!(err, StorageError::Open { .. }));
}

#[test]
fn unwritable_destination_is_a_create_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no/such/dir/snap.fsd");
    let err = save(&sample_snapshot(0), &path).unwrap_err();
    assert!(matches!(err, StorageError::Create { .. }));
}
