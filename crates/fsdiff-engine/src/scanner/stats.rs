//! Live counters shared between the walker, aggregator, and progress reporter.

use std::sync::atomic::{AtomicU64, Ordering};

use fsdiff_core::types::FileRecord;

#[derive(Debug, Default)]
pub struct LiveStats {
    files: AtomicU64,
    dirs: AtomicU64,
    bytes: AtomicU64,
    errors: AtomicU64,
    skipped: AtomicU64,
}

/// A point-in-time read of [`LiveStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSample {
    pub files: u64,
    pub dirs: u64,
    /// Sum of non-directory sizes.
    pub bytes: u64,
    /// Soft failures, including skipped paths.
    pub errors: u64,
    /// Paths dropped because the worker pool stayed saturated.
    pub skipped: u64,
}

impl StatsSample {
    pub fn entries(&self) -> u64 {
        self.files + self.dirs
    }
}

impl LiveStats {
    pub fn record(&self, record: &FileRecord) {
        if record.is_dir {
            self.dirs.fetch_add(1, Ordering::Relaxed);
        } else {
            self.files.fetch_add(1, Ordering::Relaxed);
            self.bytes.fetch_add(record.size, Ordering::Relaxed);
        }
    }

    pub fn add_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// A skipped path is also a soft error.
    pub fn add_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sample(&self) -> StatsSample {
        StatsSample {
            files: self.files.load(Ordering::Relaxed),
            dirs: self.dirs.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}
