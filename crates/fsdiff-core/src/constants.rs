//! Compiled defaults shared across the fsdiff crates.

/// Current snapshot container format version. `save` always stamps this.
pub const FORMAT_VERSION: &str = "2.0.0";

/// Digest value recorded for a regular file whose bytes could not be read.
pub const HASH_ERROR_SENTINEL: &str = "ERROR";

/// Default read buffer for content hashing: 256 KiB.
pub const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;

/// Smallest and largest accepted hashing buffers.
pub const MIN_BUFFER_SIZE: usize = 4 * 1024;
pub const MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Hard ceiling on the worker pool, regardless of core count.
pub const MAX_WORKERS: usize = 64;

/// Upper bound accepted by config validation.
pub const MAX_CONFIGURED_WORKERS: usize = 1024;

/// Records per batch frame in the snapshot container.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Flush the compressed stream every N batch frames.
pub const DEFAULT_FLUSH_EVERY_BATCHES: usize = 10;

/// Default zstd level for snapshot containers.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// How long the walker waits for room in the job queue before skipping a path.
pub const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 5_000;

/// Progress reporter tick.
pub const DEFAULT_PROGRESS_INTERVAL_SECS: u64 = 2;

/// Resident-memory growth between two progress ticks that raises an alert.
pub const DEFAULT_MEMORY_ALERT_MB: u64 = 100;

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = "fsdiff.toml";

/// Environment variable read by `init_tracing`.
pub const LOG_ENV_VAR: &str = "FSDIFF_LOG";
