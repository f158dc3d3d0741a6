//! Hashing workers and the single aggregator.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender};
use fsdiff_core::constants::HASH_ERROR_SENTINEL;
use fsdiff_core::errors::StorageError;
use fsdiff_core::events::{EventDispatcher, ScanErrorEvent};
use fsdiff_core::traits::{Cancellable, CancellationToken, FileMetadataProvider, RecordSink};
use fsdiff_core::types::FileRecord;

use super::stats::LiveStats;
use crate::hasher::ContentHasher;
use crate::platform::portable_mode;

pub(crate) struct Job {
    pub path: PathBuf,
}

/// What a worker learned about one path. A record with an error is a soft
/// failure (hash sentinel); an error without a record means the path could
/// not be stat'ed and is left out of the snapshot.
pub(crate) struct FileResult {
    pub path: PathBuf,
    pub record: Option<FileRecord>,
    pub error: Option<String>,
}

pub(crate) struct WorkerContext<'a> {
    pub provider: &'a dyn FileMetadataProvider,
    pub buffer_size: usize,
    pub collect_security: bool,
    pub cancel: &'a CancellationToken,
    pub abort: &'a CancellationToken,
}

impl WorkerContext<'_> {
    fn stopped(&self) -> bool {
        self.cancel.is_cancelled() || self.abort.is_cancelled()
    }
}

pub(crate) fn run_worker(jobs: Receiver<Job>, results: Sender<FileResult>, ctx: &WorkerContext<'_>) {
    let mut hasher = ContentHasher::new(ctx.buffer_size);
    for job in jobs.iter() {
        // Keep draining after a stop so the walker never blocks on a full queue.
        if ctx.stopped() {
            continue;
        }
        let result = build_record(job.path, &mut hasher, ctx.provider, ctx.collect_security);
        if results.send(result).is_err() {
            break;
        }
    }
}

pub(crate) fn build_record(
    path: PathBuf,
    hasher: &mut ContentHasher,
    provider: &dyn FileMetadataProvider,
    collect_security: bool,
) -> FileResult {
    let metadata = match std::fs::symlink_metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) => {
            return FileResult {
                error: Some(format!("stat failed: {e}")),
                path,
                record: None,
            }
        }
    };

    let info = provider.get_info(&path, &metadata);
    let mode = if info.permission_bits != 0 {
        info.permission_bits
    } else {
        portable_mode(&metadata)
    };
    let size = metadata.len();

    let mut error = None;
    let content_digest = if metadata.file_type().is_file() && size > 0 {
        match hasher.hash_file(&path) {
            Ok(digest) => digest,
            Err(e) => {
                error = Some(format!("read failed: {e}"));
                HASH_ERROR_SENTINEL.to_string()
            }
        }
    } else {
        String::new()
    };

    let record = FileRecord {
        path: path_key(&path),
        content_digest,
        size,
        mode,
        mod_time: metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        is_dir: metadata.is_dir(),
        owner_id: info.owner_id,
        group_id: info.group_id,
        security_metadata: if collect_security {
            info.security_metadata.filter(|m| !m.is_empty())
        } else {
            None
        },
    };

    FileResult {
        path,
        record: Some(record),
        error,
    }
}

pub(crate) fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Sole consumer of worker output and sole writer to `sink`. After a sink
/// failure it raises `abort` and keeps draining so workers can finish.
pub(crate) fn aggregate<S: RecordSink>(
    results: Receiver<FileResult>,
    sink: &mut S,
    stats: &LiveStats,
    events: &EventDispatcher,
    abort: &CancellationToken,
) -> Result<(), StorageError> {
    let mut failure = None;
    for result in results.iter() {
        if let Some(message) = result.error {
            stats.add_error();
            tracing::debug!(path = %result.path.display(), error = %message, "soft scan error");
            events.emit_scan_error(&ScanErrorEvent {
                path: result.path,
                message,
            });
        }
        let Some(record) = result.record else {
            continue;
        };
        if failure.is_some() {
            continue;
        }
        stats.record(&record);
        if let Err(e) = sink.accept(record) {
            tracing::error!(error = %e, "snapshot sink failed; stopping scan");
            abort.cancel();
            failure = Some(e);
        }
    }
    failure.map_or(Ok(()), Err)
}
