//! Logging setup: `tracing` with an `EnvFilter` read from `FSDIFF_LOG`.

pub mod setup;

pub use setup::init_tracing;
