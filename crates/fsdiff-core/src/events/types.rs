//! Event payloads.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ScanStartedEvent {
    pub root: PathBuf,
    pub workers: usize,
    pub buffer_size: usize,
    pub streaming: bool,
}

/// Periodic throughput sample.
#[derive(Debug, Clone)]
pub struct ScanProgressEvent {
    pub files_processed: u64,
    pub dirs_processed: u64,
    pub bytes_processed: u64,
    pub errors: u64,
    pub elapsed: Duration,
    pub files_per_second: f64,
    /// Resident memory of this process, when measurable.
    pub resident_bytes: Option<u64>,
}

/// Resident memory grew by more than the configured threshold between ticks.
#[derive(Debug, Clone)]
pub struct MemoryAlertEvent {
    pub previous_bytes: u64,
    pub current_bytes: u64,
    pub threshold_bytes: u64,
}

/// A soft, per-path failure. The scan continues.
#[derive(Debug, Clone)]
pub struct ScanErrorEvent {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ScanCompleteEvent {
    pub file_count: u64,
    pub dir_count: u64,
    pub total_size: u64,
    pub error_count: u64,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct DiffCompleteEvent {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub critical: usize,
    pub fast_path: bool,
    pub duration: Duration,
}
