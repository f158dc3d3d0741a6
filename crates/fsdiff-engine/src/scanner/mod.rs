//! Scanner: one walker, a bounded pool of hashing workers, one aggregator.
//!
//! The walker sends paths into a bounded job queue, waiting at most the
//! dispatch timeout before skipping a path. Workers build `FileRecord`s and
//! send them to the aggregator, the only writer to the record sink. Counters
//! are atomics so the progress reporter can read them while the scan runs.

pub mod progress;
pub mod stats;
mod walk;
mod worker;

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use fsdiff_core::config::{ScanConfig, StorageConfig};
use fsdiff_core::constants::FORMAT_VERSION;
use fsdiff_core::errors::{ScanError, StorageError};
use fsdiff_core::events::{EventDispatcher, ScanCompleteEvent, ScanStartedEvent};
use fsdiff_core::traits::{Cancellable, CancellationToken, FileMetadataProvider, RecordSink};
use fsdiff_core::types::{FileRecord, FxHashMap, Snapshot, SnapshotStats};
use fsdiff_core::RootDigest;
use fsdiff_storage::{SnapshotWriter, WriteSummary};

pub use progress::LogProgressHandler;
pub use stats::{LiveStats, StatsSample};

use crate::filter::PathFilter;
use crate::platform::{self, StatMetadataProvider};
use crate::system::collect_system_info;
use progress::ProgressReporter;
use walk::{WalkOutcome, Walker};
use worker::{FileResult, Job, WorkerContext};

/// Jobs buffered per worker before the walker starts waiting.
const JOBS_PER_WORKER: usize = 4;
/// Results buffered per worker before workers start waiting.
const RESULTS_PER_WORKER: usize = 2;

pub struct Scanner {
    config: ScanConfig,
    provider: Arc<dyn FileMetadataProvider>,
    events: EventDispatcher,
    cancel: CancellationToken,
}

struct RunOutcome {
    sample: StatsSample,
    duration: Duration,
}

/// In-memory sink keyed by path.
#[derive(Default)]
struct MapSink {
    files: FxHashMap<String, FileRecord>,
}

impl RecordSink for MapSink {
    fn accept(&mut self, record: FileRecord) -> Result<(), StorageError> {
        self.files.insert(record.path.clone(), record);
        Ok(())
    }
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            provider: Arc::new(StatMetadataProvider),
            events: EventDispatcher::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_metadata_provider(mut self, provider: Arc<dyn FileMetadataProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// A handle that cancels scans run by this scanner.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan `root` into an in-memory snapshot.
    pub fn scan(&self, root: &Path) -> Result<Snapshot, ScanError> {
        check_root(root)?;
        let mut system_info = collect_system_info(root);
        let mut sink = MapSink::default();
        let run = self.run(root, &mut sink, false)?;

        system_info.scan_duration = run.duration;
        let mut snapshot = Snapshot {
            format_version: FORMAT_VERSION.to_string(),
            system_info,
            files: sink.files,
            root_digest: RootDigest::EMPTY,
            stats: SnapshotStats {
                file_count: run.sample.files,
                dir_count: run.sample.dirs,
                total_size: run.sample.bytes,
                error_count: run.sample.errors,
                scan_duration: run.duration,
            },
            tree: None,
        };
        snapshot.root_digest = snapshot.compute_root_digest();
        tracing::info!(
            root = %root.display(),
            files = snapshot.stats.file_count,
            dirs = snapshot.stats.dir_count,
            bytes = snapshot.stats.total_size,
            errors = snapshot.stats.error_count,
            root_digest = %snapshot.root_digest,
            elapsed_ms = run.duration.as_millis() as u64,
            "scan complete"
        );
        Ok(snapshot)
    }

    /// Scan `root` straight into a snapshot file, holding at most one batch
    /// of records in memory. A failed or cancelled scan removes the partial
    /// output.
    pub fn scan_to_file(
        &self,
        root: &Path,
        output: &Path,
        storage: &StorageConfig,
    ) -> Result<WriteSummary, ScanError> {
        check_root(root)?;
        let system_info = collect_system_info(root);
        let mut writer = SnapshotWriter::create(output, &system_info, storage)?;

        let run = match self.run(root, &mut writer, true) {
            Ok(run) => run,
            Err(e) => {
                drop(writer);
                if let Err(remove) = std::fs::remove_file(output) {
                    tracing::debug!(path = %output.display(), error = %remove, "could not remove partial snapshot");
                }
                return Err(e);
            }
        };

        let summary = writer.finish(run.sample.errors, run.duration)?;
        tracing::info!(
            root = %root.display(),
            output = %output.display(),
            files = summary.stats.file_count,
            dirs = summary.stats.dir_count,
            bytes = summary.stats.total_size,
            errors = summary.stats.error_count,
            batches = summary.batches,
            root_digest = %summary.root_digest,
            elapsed_ms = run.duration.as_millis() as u64,
            "streaming scan complete"
        );
        Ok(summary)
    }

    fn run<S: RecordSink + Send>(
        &self,
        root: &Path,
        sink: &mut S,
        streaming: bool,
    ) -> Result<RunOutcome, ScanError> {
        let workers = self.config.effective_workers().max(1);
        let buffer_size = self.config.effective_buffer_size();
        let filter = Arc::new(PathFilter::for_root(root, &self.config.ignore_patterns));
        platform::raise_fd_limit();

        let mut events = self.events.clone();
        let verbose = self.config.effective_verbose();
        if verbose {
            events.register(Arc::new(LogProgressHandler));
        }
        let report_progress = verbose || self.events.handler_count() > 0;

        tracing::info!(
            root = %root.display(),
            workers,
            buffer_size,
            streaming,
            ignore_patterns = filter.user_pattern_count(),
            "scan started"
        );
        events.emit_scan_started(&ScanStartedEvent {
            root: root.to_path_buf(),
            workers,
            buffer_size,
            streaming,
        });

        let started = Instant::now();
        let stats = LiveStats::default();
        let abort = CancellationToken::new();
        let ctx = WorkerContext {
            provider: self.provider.as_ref(),
            buffer_size,
            collect_security: self.config.effective_collect_security_metadata(),
            cancel: &self.cancel,
            abort: &abort,
        };
        let walker = Walker {
            filter,
            dispatch_timeout: self.config.effective_dispatch_timeout(),
            stats: &stats,
            events: &events,
            cancel: &self.cancel,
            abort: &abort,
        };
        let reporter = ProgressReporter {
            stats: &stats,
            events: &events,
            interval: self.config.effective_progress_interval(),
            alert_threshold: self.config.effective_memory_alert_bytes(),
            started,
        };

        let (job_tx, job_rx) = bounded::<Job>(workers * JOBS_PER_WORKER);
        let (result_tx, result_rx) = bounded::<FileResult>(workers * RESULTS_PER_WORKER);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let (walk, sink_result) = thread::scope(|s| {
            let mut handles = Vec::with_capacity(workers);
            for index in 0..workers {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                let ctx = &ctx;
                let spawned = thread::Builder::new()
                    .name(format!("fsdiff-hash-{index}"))
                    .spawn_scoped(s, move || worker::run_worker(jobs, results, ctx));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        drop(job_tx);
                        return Err(ScanError::WorkerSpawn { source });
                    }
                }
            }
            drop(job_rx);
            drop(result_tx);

            let aggregator = thread::Builder::new()
                .name("fsdiff-aggregate".to_string())
                .spawn_scoped(s, || worker::aggregate(result_rx, sink, &stats, &events, &abort));
            let aggregator = match aggregator {
                Ok(handle) => handle,
                Err(source) => {
                    drop(job_tx);
                    return Err(ScanError::WorkerSpawn { source });
                }
            };

            let progress = if report_progress {
                let reporter = &reporter;
                thread::Builder::new()
                    .name("fsdiff-progress".to_string())
                    .spawn_scoped(s, move || reporter.run(stop_rx))
                    .map_err(|e| tracing::warn!(error = %e, "progress reporter unavailable"))
                    .ok()
            } else {
                None
            };

            let walk = walker.run(root, &job_tx);
            drop(job_tx);

            let mut worker_panicked = false;
            for handle in handles {
                worker_panicked |= handle.join().is_err();
            }
            let sink_result = aggregator.join();
            drop(stop_tx);
            if let Some(handle) = progress {
                if handle.join().is_err() {
                    tracing::warn!("progress reporter panicked");
                }
            }

            if worker_panicked {
                return Err(ScanError::ThreadPanicked { thread: "worker" });
            }
            let sink_result =
                sink_result.map_err(|_| ScanError::ThreadPanicked { thread: "aggregator" })?;
            Ok((walk, sink_result))
        })?;

        let duration = started.elapsed();
        let sample = stats.sample();
        finish_run(walk, sink_result, sample, &self.cancel)?;

        events.emit_scan_complete(&ScanCompleteEvent {
            file_count: sample.files,
            dir_count: sample.dirs,
            total_size: sample.bytes,
            error_count: sample.errors,
            duration,
        });
        if sample.skipped > 0 {
            tracing::warn!(skipped = sample.skipped, "paths skipped under backpressure");
        }
        tracing::debug!(dispatched = walk.dispatched, "walk finished");
        Ok(RunOutcome { sample, duration })
    }
}

fn finish_run(
    walk: WalkOutcome,
    sink_result: Result<(), StorageError>,
    sample: StatsSample,
    cancel: &CancellationToken,
) -> Result<(), ScanError> {
    if walk.cancelled || cancel.is_cancelled() {
        tracing::info!(entries = sample.entries(), "scan cancelled");
        return Err(ScanError::Cancelled {
            files_processed: sample.entries(),
        });
    }
    sink_result?;
    if walk.workers_gone {
        return Err(ScanError::WorkersGone);
    }
    Ok(())
}

/// The root must be a readable directory; anything else is fatal.
fn check_root(root: &Path) -> Result<(), ScanError> {
    let metadata = std::fs::metadata(root).map_err(|source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::RootNotDirectory {
            path: root.to_path_buf(),
        });
    }
    std::fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Scan `root` with `config` and the default metadata provider.
pub fn scan(root: &Path, config: &ScanConfig) -> Result<Snapshot, ScanError> {
    Scanner::new(config.clone()).scan(root)
}

/// Streaming scan of `root` into `output`.
pub fn scan_to_file(
    root: &Path,
    output: &Path,
    config: &ScanConfig,
    storage: &StorageConfig,
) -> Result<WriteSummary, ScanError> {
    Scanner::new(config.clone()).scan_to_file(root, output, storage)
}
