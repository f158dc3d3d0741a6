//! Destination for records produced by a scan.

use crate::errors::StorageError;
use crate::types::FileRecord;

/// Receives each record exactly once from the scan aggregator.
///
/// The aggregator is the only caller, so implementations need no locking.
pub trait RecordSink {
    fn accept(&mut self, record: FileRecord) -> Result<(), StorageError>;
}

/// Collects records in memory. Used by tests and small scans.
#[derive(Debug, Default)]
pub struct VecSink {
    pub records: Vec<FileRecord>,
}

impl RecordSink for VecSink {
    fn accept(&mut self, record: FileRecord) -> Result<(), StorageError> {
        self.records.push(record);
        Ok(())
    }
}
