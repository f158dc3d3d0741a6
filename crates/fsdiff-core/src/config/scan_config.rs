//! Scanner configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_DISPATCH_TIMEOUT_MS, DEFAULT_MEMORY_ALERT_MB,
    DEFAULT_PROGRESS_INTERVAL_SECS, MAX_WORKERS,
};

/// Configuration for the scanner subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Worker threads hashing files. Default: scaled to CPU cores.
    pub workers: Option<usize>,
    /// Read buffer per worker in bytes. Default: 256 KiB.
    pub buffer_size: Option<usize>,
    /// Exclusion patterns applied on top of the built-in defaults.
    pub ignore_patterns: Vec<String>,
    /// Emit periodic progress and a final summary. Default: false.
    pub verbose: Option<bool>,
    /// Job-queue wait before a path is skipped. Default: 5000 ms.
    pub dispatch_timeout_ms: Option<u64>,
    /// Progress reporter tick. Default: 2 s.
    pub progress_interval_secs: Option<u64>,
    /// Resident-memory growth per tick that raises an alert. Default: 100 MB.
    pub memory_alert_mb: Option<u64>,
    /// Ask the metadata provider for security attributes. Default: false.
    pub collect_security_metadata: Option<bool>,
}

impl ScanConfig {
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }

    pub fn effective_buffer_size(&self) -> usize {
        self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE)
    }

    pub fn effective_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn effective_dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms.unwrap_or(DEFAULT_DISPATCH_TIMEOUT_MS))
    }

    pub fn effective_progress_interval(&self) -> Duration {
        Duration::from_secs(
            self.progress_interval_secs
                .unwrap_or(DEFAULT_PROGRESS_INTERVAL_SECS),
        )
    }

    pub fn effective_memory_alert_bytes(&self) -> u64 {
        self.memory_alert_mb
            .unwrap_or(DEFAULT_MEMORY_ALERT_MB)
            .saturating_mul(1024 * 1024)
    }

    pub fn effective_collect_security_metadata(&self) -> bool {
        self.collect_security_metadata.unwrap_or(false)
    }
}

/// Worker count scaled to the machine's cores, see [`workers_for_cores`].
pub fn default_workers() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    workers_for_cores(cores)
}

/// Up to 4 cores: twice the cores. Up to 8: cores + 4. Beyond: one per
/// core. Never more than `MAX_WORKERS`.
pub fn workers_for_cores(cores: usize) -> usize {
    let scaled = match cores {
        0 => 1,
        1..=4 => cores * 2,
        5..=8 => cores + 4,
        _ => cores,
    };
    scaled.min(MAX_WORKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_scaling_follows_core_tiers() {
        assert_eq!(workers_for_cores(1), 2);
        assert_eq!(workers_for_cores(4), 8);
        assert_eq!(workers_for_cores(6), 10);
        assert_eq!(workers_for_cores(8), 12);
        assert_eq!(workers_for_cores(32), 32);
        assert_eq!(workers_for_cores(256), MAX_WORKERS);
    }

    #[test]
    fn memory_alert_threshold_saturates() {
        let default = ScanConfig::default();
        assert_eq!(default.effective_memory_alert_bytes(), DEFAULT_MEMORY_ALERT_MB * 1024 * 1024);

        let huge = ScanConfig {
            memory_alert_mb: Some(u64::MAX / 2),
            ..ScanConfig::default()
        };
        assert_eq!(huge.effective_memory_alert_bytes(), u64::MAX);
    }
}
