//! FileRecord: one entry per filesystem object in a snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::security::SecurityMetadata;
use crate::constants::HASH_ERROR_SENTINEL;

/// File type mask and type values, matching the unix `st_mode` layout.
pub const S_IFMT: u32 = 0o170_000;
pub const S_IFSOCK: u32 = 0o140_000;
pub const S_IFLNK: u32 = 0o120_000;
pub const S_IFREG: u32 = 0o100_000;
pub const S_IFBLK: u32 = 0o060_000;
pub const S_IFDIR: u32 = 0o040_000;
pub const S_IFCHR: u32 = 0o020_000;
pub const S_IFIFO: u32 = 0o010_000;

pub const S_ISUID: u32 = 0o4000;
pub const S_ISGID: u32 = 0o2000;
pub const S_ISVTX: u32 = 0o1000;

/// Metadata and content digest of a single filesystem object.
///
/// `content_digest` is empty for directories, zero-length files, and
/// non-regular files; it holds [`HASH_ERROR_SENTINEL`] when the file could
/// not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(default)]
    pub content_digest: String,
    pub size: u64,
    /// Type and permission bits in `st_mode` layout.
    pub mode: u32,
    pub mod_time: DateTime<Utc>,
    pub is_dir: bool,
    #[serde(default)]
    pub owner_id: u32,
    #[serde(default)]
    pub group_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_metadata: Option<SecurityMetadata>,
}

impl FileRecord {
    pub fn file_type_bits(&self) -> u32 {
        self.mode & S_IFMT
    }

    /// Permission bits including setuid, setgid, and sticky.
    pub fn permission_bits(&self) -> u32 {
        self.mode & 0o7777
    }

    pub fn is_regular(&self) -> bool {
        !self.is_dir && self.file_type_bits() == S_IFREG
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type_bits() == S_IFLNK
    }

    /// True when the digest reflects actual file bytes.
    pub fn has_content_digest(&self) -> bool {
        !self.content_digest.is_empty() && self.content_digest != HASH_ERROR_SENTINEL
    }

    pub fn hash_failed(&self) -> bool {
        self.content_digest == HASH_ERROR_SENTINEL
    }

    /// `ls -l` style rendering, e.g. `drwxr-xr-x` or `-rwsr-xr-x`.
    pub fn mode_string(&self) -> String {
        render_mode(self.mode, self.is_dir)
    }
}

/// Render `st_mode` bits the way `ls -l` does.
pub fn render_mode(mode: u32, is_dir: bool) -> String {
    let type_char = match mode & S_IFMT {
        _ if is_dir => 'd',
        S_IFDIR => 'd',
        S_IFLNK => 'l',
        S_IFBLK => 'b',
        S_IFCHR => 'c',
        S_IFIFO => 'p',
        S_IFSOCK => 's',
        _ => '-',
    };

    let mut out = String::with_capacity(10);
    out.push(type_char);

    let triplets = [(0o400, 0o200, 0o100), (0o040, 0o020, 0o010), (0o004, 0o002, 0o001)];
    let specials = [(S_ISUID, 's', 'S'), (S_ISGID, 's', 'S'), (S_ISVTX, 't', 'T')];

    for ((r, w, x), (special, set_exec, set_no_exec)) in triplets.into_iter().zip(specials) {
        out.push(if mode & r != 0 { 'r' } else { '-' });
        out.push(if mode & w != 0 { 'w' } else { '-' });
        let exec = mode & x != 0;
        out.push(match (mode & special != 0, exec) {
            (true, true) => set_exec,
            (true, false) => set_no_exec,
            (false, true) => 'x',
            (false, false) => '-',
        });
    }
    out
}
