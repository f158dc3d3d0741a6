//! Opaque per-file security metadata supplied by a `FileMetadataProvider`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Extended security attributes of one filesystem object.
///
/// The core never interprets these values; they are carried through
/// snapshots so reports can show them. Providers on platforms without
/// extended metadata return `None` instead of an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selinux_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub acl: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub xattrs: BTreeMap<String, String>,
    pub immutable: bool,
    pub append_only: bool,
    pub no_dump: bool,
    pub compressed: bool,
}

impl SecurityMetadata {
    /// True when no attribute or flag is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
