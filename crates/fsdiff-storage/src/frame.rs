//! Container frames.

use chrono::{DateTime, Utc};
use fsdiff_core::types::{FileRecord, SnapshotStats, SystemInfo};
use fsdiff_core::RootDigest;
use serde::{Deserialize, Serialize};

/// One line of the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Frame {
    Header(HeaderFrame),
    Batch(BatchFrame),
    Trailer(TrailerFrame),
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Header(_) => FrameKind::Header,
            Frame::Batch(_) => FrameKind::Batch,
            Frame::Trailer(_) => FrameKind::Trailer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Header,
    Batch,
    Trailer,
}

impl FrameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameKind::Header => "header",
            FrameKind::Batch => "batch",
            FrameKind::Trailer => "trailer",
        }
    }
}

/// Only the tag of a frame; the rest of the line is skipped unparsed.
#[derive(Debug, Deserialize)]
pub(crate) struct FrameTag {
    pub frame: FrameKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderFrame {
    pub format_version: String,
    pub system_info: SystemInfo,
    pub created: DateTime<Utc>,
    /// Written while scanning; stats and root live only in the trailer.
    pub streaming: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<SnapshotStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_digest: Option<RootDigest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFrame {
    pub records: Vec<FileRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailerFrame {
    pub stats: SnapshotStats,
    pub root_digest: RootDigest,
}
