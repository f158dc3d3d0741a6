//! fsdiff-engine: scanning, filtering, hashing, and diffing.
//!
//! Data flow: the walker emits paths, a bounded worker pool turns them into
//! `FileRecord`s, one aggregator folds them into a snapshot (or a streaming
//! snapshot file), and the differ compares two snapshots.

pub mod diff;
pub mod filter;
pub mod hasher;
pub mod platform;
pub mod scanner;
pub mod system;

pub use diff::{compare, ChangeDetail, ChangeKind, CriticalChange, DiffResult, DiffSummary, Differ, ExportRow};
pub use filter::PathFilter;
pub use hasher::ContentHasher;
pub use scanner::Scanner;
