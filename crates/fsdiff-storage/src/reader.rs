//! Line-oriented frame reader over a zstd stream.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use fsdiff_core::errors::StorageError;

use crate::frame::{Frame, FrameKind, FrameTag};

pub struct FrameReader<R: BufRead> {
    path: PathBuf,
    inner: R,
    line: String,
    line_no: usize,
}

pub type FileFrameReader = FrameReader<BufReader<zstd::Decoder<'static, BufReader<File>>>>;

impl FileFrameReader {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let file = File::open(path).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder =
            zstd::Decoder::new(file).map_err(|source| StorageError::Compression { source })?;
        Ok(FrameReader::new(path, BufReader::new(decoder)))
    }
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(path: &Path, inner: R) -> Self {
        Self {
            path: path.to_path_buf(),
            inner,
            line: String::new(),
            line_no: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Advance to the next non-blank line. `Ok(false)` at end of stream.
    fn advance(&mut self) -> Result<bool, StorageError> {
        loop {
            self.line.clear();
            let read = self.inner.read_line(&mut self.line).map_err(|e| StorageError::Decode {
                line: self.line_no + 1,
                message: e.to_string(),
            })?;
            if read == 0 {
                return Ok(false);
            }
            self.line_no += 1;
            if !self.line.trim().is_empty() {
                return Ok(true);
            }
        }
    }

    fn decode_current(&self) -> Result<Frame, StorageError> {
        serde_json::from_str(&self.line).map_err(|e| StorageError::Decode {
            line: self.line_no,
            message: e.to_string(),
        })
    }

    fn tag_of_current(&self) -> Result<FrameKind, StorageError> {
        serde_json::from_str::<FrameTag>(&self.line)
            .map(|tag| tag.frame)
            .map_err(|e| StorageError::Decode {
                line: self.line_no,
                message: e.to_string(),
            })
    }

    /// Decode the next frame, or `None` at end of stream.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, StorageError> {
        if !self.advance()? {
            return Ok(None);
        }
        self.decode_current().map(Some)
    }

    /// Skip forward to the next frame of `kind` and decode only that one.
    /// Frames in between are tag-checked but never materialized.
    pub fn skip_to(&mut self, kind: FrameKind) -> Result<Option<Frame>, StorageError> {
        while self.advance()? {
            if self.tag_of_current()? == kind {
                return self.decode_current().map(Some);
            }
        }
        Ok(None)
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }
}
