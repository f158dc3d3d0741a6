//! Order-independent root digest: XOR fold of per-record xxh3 hashes.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::traits::DigestSource;

/// Fixed-size summary of every record in a snapshot.
///
/// Zero is the defined value for an empty record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootDigest(pub u64);

impl RootDigest {
    pub const EMPTY: RootDigest = RootDigest(0);

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RootDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Feed the canonical field encoding of a record into `hasher`.
pub(crate) fn feed_record<T: DigestSource + ?Sized>(hasher: &mut Xxh3, record: &T) {
    hasher.update(record.path().as_bytes());
    hasher.update(&[0]);
    hasher.update(record.content_digest().as_bytes());
    hasher.update(&[0]);
    hasher.update(&record.size().to_le_bytes());
    hasher.update(&record.mode().to_le_bytes());
    let mtime = record.mod_time();
    hasher.update(&mtime.timestamp().to_le_bytes());
    hasher.update(&mtime.timestamp_subsec_nanos().to_le_bytes());
    hasher.update(&record.owner_id().to_le_bytes());
    hasher.update(&record.group_id().to_le_bytes());
}

/// 64-bit hash of one record's path, digest, and metadata.
pub fn record_hash<T: DigestSource + ?Sized>(record: &T) -> u64 {
    let mut hasher = Xxh3::new();
    feed_record(&mut hasher, record);
    hasher.digest()
}

/// Root digest of a full record set, folded in parallel.
///
/// Accepts anything rayon can iterate, e.g. `&Vec<FileRecord>` or
/// `files.par_iter().map(|(_, r)| r)`.
pub fn digest<I>(records: I) -> RootDigest
where
    I: IntoParallelIterator,
    I::Item: DigestSource,
{
    let folded = records
        .into_par_iter()
        .map(|record| record_hash(&record))
        .reduce(|| 0, |a, b| a ^ b);
    RootDigest(folded)
}

/// Incremental form of [`digest`] for streaming scans.
///
/// Folding the same set in any order yields the same value as `digest`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollingDigest {
    acc: u64,
    count: u64,
}

impl RollingDigest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold_in<T: DigestSource + ?Sized>(&mut self, record: &T) {
        self.acc ^= record_hash(record);
        self.count += 1;
    }

    /// Remove a record previously folded in. XOR is its own inverse.
    pub fn fold_out<T: DigestSource + ?Sized>(&mut self, record: &T) {
        self.acc ^= record_hash(record);
        self.count = self.count.saturating_sub(1);
    }

    /// Combine with a digest computed over a disjoint record set.
    pub fn merge(&mut self, other: &RollingDigest) {
        self.acc ^= other.acc;
        self.count += other.count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn finish(&self) -> RootDigest {
        RootDigest(self.acc)
    }
}
