//! Streaming snapshot writer.
//!
//! Records are buffered into batches and encoded as they fill, so peak
//! memory is one batch regardless of how many records pass through.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use fsdiff_core::config::StorageConfig;
use fsdiff_core::constants::FORMAT_VERSION;
use fsdiff_core::errors::StorageError;
use fsdiff_core::traits::RecordSink;
use fsdiff_core::types::{FileRecord, SnapshotStats, SystemInfo};
use fsdiff_core::{RollingDigest, RootDigest};

use crate::frame::{BatchFrame, Frame, HeaderFrame, TrailerFrame};

/// What a finished writer produced.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub stats: SnapshotStats,
    pub root_digest: RootDigest,
    pub batches: usize,
    /// Size of the compressed file on disk.
    pub compressed_bytes: u64,
}

pub struct SnapshotWriter {
    path: PathBuf,
    encoder: zstd::Encoder<'static, BufWriter<File>>,
    batch: Vec<FileRecord>,
    batch_size: usize,
    flush_every: usize,
    batches_written: usize,
    rolling: RollingDigest,
    observed: SnapshotStats,
}

impl SnapshotWriter {
    /// Start a streaming snapshot at `path`. Stats and root digest are
    /// written in the trailer by [`finish`](Self::finish).
    pub fn create(
        path: &Path,
        system_info: &SystemInfo,
        config: &StorageConfig,
    ) -> Result<Self, StorageError> {
        let header = HeaderFrame {
            format_version: FORMAT_VERSION.to_string(),
            system_info: system_info.clone(),
            created: Utc::now(),
            streaming: true,
            stats: None,
            root_digest: None,
        };
        Self::with_header(path, header, config)
    }

    pub(crate) fn with_header(
        path: &Path,
        header: HeaderFrame,
        config: &StorageConfig,
    ) -> Result<Self, StorageError> {
        let file = File::create(path).map_err(|source| StorageError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let encoder = zstd::Encoder::new(
            BufWriter::new(file),
            config.effective_compression_level(),
        )
        .map_err(|source| StorageError::Compression { source })?;

        let batch_size = config.effective_batch_size().max(1);
        let mut writer = Self {
            path: path.to_path_buf(),
            encoder,
            batch: Vec::with_capacity(batch_size),
            batch_size,
            flush_every: config.effective_flush_every_batches().max(1),
            batches_written: 0,
            rolling: RollingDigest::new(),
            observed: SnapshotStats::default(),
        };
        writer.write_frame(&Frame::Header(header))?;
        Ok(writer)
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), StorageError> {
        serde_json::to_writer(&mut self.encoder, frame).map_err(|e| StorageError::Encode {
            frame: frame.kind().as_str(),
            message: e.to_string(),
        })?;
        self.encoder.write_all(b"\n")?;
        Ok(())
    }

    /// Buffer one record, writing a batch frame when the batch is full.
    pub fn push(&mut self, record: FileRecord) -> Result<(), StorageError> {
        self.rolling.fold_in(&record);
        self.observed.observe(&record);
        self.batch.push(record);
        if self.batch.len() >= self.batch_size {
            self.write_batch()?;
        }
        Ok(())
    }

    fn write_batch(&mut self) -> Result<(), StorageError> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let records = std::mem::replace(&mut self.batch, Vec::with_capacity(self.batch_size));
        self.write_frame(&Frame::Batch(BatchFrame { records }))?;
        self.batches_written += 1;
        if self.batches_written % self.flush_every == 0 {
            self.encoder.flush()?;
            tracing::debug!(
                path = %self.path.display(),
                batches = self.batches_written,
                records = self.rolling.count(),
                "flushed snapshot stream"
            );
        }
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.rolling.count()
    }

    /// Root digest over every record pushed so far.
    pub fn root_digest(&self) -> RootDigest {
        self.rolling.finish()
    }

    /// Write the final batch and a trailer built from the records seen.
    pub fn finish(
        self,
        error_count: u64,
        scan_duration: Duration,
    ) -> Result<WriteSummary, StorageError> {
        let stats = SnapshotStats {
            error_count,
            scan_duration,
            ..self.observed
        };
        let root_digest = self.rolling.finish();
        self.finish_with(stats, root_digest)
    }

    /// Write the final batch and a trailer carrying the given values.
    pub(crate) fn finish_with(
        mut self,
        stats: SnapshotStats,
        root_digest: RootDigest,
    ) -> Result<WriteSummary, StorageError> {
        self.write_batch()?;
        self.write_frame(&Frame::Trailer(TrailerFrame { stats, root_digest }))?;

        let buffered = self
            .encoder
            .finish()
            .map_err(|source| StorageError::Compression { source })?;
        let file = buffered.into_inner().map_err(|e| StorageError::Io {
            source: e.into_error(),
        })?;
        file.sync_all()?;

        let compressed_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        Ok(WriteSummary {
            path: self.path,
            stats,
            root_digest,
            batches: self.batches_written,
            compressed_bytes,
        })
    }
}

impl RecordSink for SnapshotWriter {
    fn accept(&mut self, record: FileRecord) -> Result<(), StorageError> {
        self.push(record)
    }
}
