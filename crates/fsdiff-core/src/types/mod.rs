//! Data model: file records, snapshots, system info, security metadata.

pub mod collections;
pub mod file_record;
pub mod security;
pub mod serde_helpers;
pub mod snapshot;
pub mod system_info;

pub use collections::FxHashMap;
pub use file_record::FileRecord;
pub use security::SecurityMetadata;
pub use snapshot::{Snapshot, SnapshotHeader, SnapshotStats};
pub use system_info::SystemInfo;
