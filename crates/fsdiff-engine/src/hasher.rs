//! Content hashing via streaming xxh3.
//!
//! Each worker owns one `ContentHasher`; its buffer is allocated once and
//! reused for every file, so memory stays flat regardless of file size.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use fsdiff_core::constants::{DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE};
use xxhash_rust::xxh3::{xxh3_64, Xxh3};

pub struct ContentHasher {
    buffer: Vec<u8>,
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

impl ContentHasher {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer: vec![0; buffer_size.max(MIN_BUFFER_SIZE)],
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Hash everything `reader` yields. Interrupted reads are retried; any
    /// other read error aborts the digest.
    pub fn hash_reader<R: Read>(&mut self, mut reader: R) -> io::Result<String> {
        let mut state = Xxh3::new();
        loop {
            match reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => state.update(&self.buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(format_digest(state.digest()))
    }

    pub fn hash_file(&mut self, path: &Path) -> io::Result<String> {
        let file = File::open(path)?;
        self.hash_reader(file)
    }
}

/// One-shot digest of an in-memory buffer. Equal to streaming the same
/// bytes through [`ContentHasher::hash_reader`].
#[inline]
pub fn hash_bytes(content: &[u8]) -> String {
    format_digest(xxh3_64(content))
}

#[inline]
fn format_digest(hash: u64) -> String {
    format!("{hash:016x}")
}
