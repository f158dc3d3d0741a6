//! Record equality and change tags.

use chrono::SecondsFormat;
use fsdiff_core::types::collections::SmallVec4;
use fsdiff_core::types::FileRecord;

/// Directories are equal when mode, mtime, owner, and group match. Files
/// are equal when digest, size, mode, owner, and group match; a file's
/// mtime alone never makes it modified.
pub fn records_equal(old: &FileRecord, new: &FileRecord) -> bool {
    if old.is_dir != new.is_dir {
        return false;
    }
    let identity =
        old.mode == new.mode && old.owner_id == new.owner_id && old.group_id == new.group_id;
    if old.is_dir {
        identity && old.mod_time == new.mod_time
    } else {
        identity && old.content_digest == new.content_digest && old.size == new.size
    }
}

/// Tags naming each differing field with its old and new value. Never
/// empty: records that differ in no tracked field get `unknown`.
pub fn describe_changes(old: &FileRecord, new: &FileRecord, show_hashes: bool) -> SmallVec4<String> {
    let mut changes = SmallVec4::new();

    // An absent digest is unknown content, not a change.
    if !old.content_digest.is_empty()
        && !new.content_digest.is_empty()
        && old.content_digest != new.content_digest
    {
        changes.push(if show_hashes {
            format!("content ({} → {})", old.content_digest, new.content_digest)
        } else {
            "content".to_string()
        });
    }
    if old.size != new.size {
        changes.push(format!("size ({} → {})", old.size, new.size));
    }
    if old.mode != new.mode {
        changes.push(format!(
            "permissions ({} → {})",
            old.mode_string(),
            new.mode_string()
        ));
    }
    if old.mod_time != new.mod_time {
        changes.push(format!(
            "mtime ({} → {})",
            old.mod_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            new.mod_time.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    if old.owner_id != new.owner_id {
        changes.push(format!("uid ({} → {})", old.owner_id, new.owner_id));
    }
    if old.group_id != new.group_id {
        changes.push(format!("gid ({} → {})", old.group_id, new.group_id));
    }

    if changes.is_empty() {
        changes.push("unknown".to_string());
    }
    changes
}
