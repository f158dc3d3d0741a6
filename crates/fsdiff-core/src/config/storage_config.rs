//! Snapshot container configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_COMPRESSION_LEVEL, DEFAULT_FLUSH_EVERY_BATCHES};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// zstd level, 1..=22. Default: 3.
    pub compression_level: Option<i32>,
    /// Records per batch frame. Default: 10,000.
    pub batch_size: Option<usize>,
    /// Flush the compressed stream every N batches. Default: 10.
    pub flush_every_batches: Option<usize>,
}

impl StorageConfig {
    pub fn effective_compression_level(&self) -> i32 {
        self.compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL)
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn effective_flush_every_batches(&self) -> usize {
        self.flush_every_batches.unwrap_or(DEFAULT_FLUSH_EVERY_BATCHES)
    }
}
