//! fsdiff-core: data model, root digests, traits, errors, config, events, and tracing
//! shared by the fsdiff storage, engine, and CLI crates.

pub mod config;
pub mod constants;
pub mod digest;
pub mod errors;
pub mod events;
pub mod traits;
pub mod tracing;
pub mod types;

pub use digest::{DigestTree, RollingDigest, RootDigest};
pub use types::{FileRecord, Snapshot, SnapshotHeader, SnapshotStats, SystemInfo};
