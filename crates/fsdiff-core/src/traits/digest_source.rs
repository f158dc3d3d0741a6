//! Read-only view consumed by the digest calculators.

use chrono::{DateTime, Utc};

use crate::types::FileRecord;

/// The fields a root digest or digest tree needs from a record.
///
/// Keeps the digest code independent of the concrete record type so
/// streaming writers and test fixtures can feed it directly.
pub trait DigestSource {
    fn path(&self) -> &str;
    fn content_digest(&self) -> &str;
    fn size(&self) -> u64;
    fn mode(&self) -> u32;
    fn mod_time(&self) -> DateTime<Utc>;
    fn owner_id(&self) -> u32;
    fn group_id(&self) -> u32;
}

impl DigestSource for FileRecord {
    fn path(&self) -> &str {
        &self.path
    }

    fn content_digest(&self) -> &str {
        &self.content_digest
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mode(&self) -> u32 {
        self.mode
    }

    fn mod_time(&self) -> DateTime<Utc> {
        self.mod_time
    }

    fn owner_id(&self) -> u32 {
        self.owner_id
    }

    fn group_id(&self) -> u32 {
        self.group_id
    }
}

impl<T: DigestSource + ?Sized> DigestSource for &T {
    fn path(&self) -> &str {
        (**self).path()
    }

    fn content_digest(&self) -> &str {
        (**self).content_digest()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn mode(&self) -> u32 {
        (**self).mode()
    }

    fn mod_time(&self) -> DateTime<Utc> {
        (**self).mod_time()
    }

    fn owner_id(&self) -> u32 {
        (**self).owner_id()
    }

    fn group_id(&self) -> u32 {
        (**self).group_id()
    }
}
