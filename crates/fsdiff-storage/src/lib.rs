//! fsdiff-storage: snapshot persistence.
//!
//! A snapshot file is a zstd stream of newline-delimited JSON frames:
//! one header, any number of record batches, one trailer. The digest tree
//! is never written; `load` rebuilds it.

pub mod frame;
pub mod reader;
pub mod store;
pub mod writer;

pub use store::{load, load_header, save, SnapshotStore};
pub use writer::{SnapshotWriter, WriteSummary};
