//! Security-sensitive change detection and severity scoring.

use std::sync::OnceLock;

use aho_corasick::AhoCorasick;
use fsdiff_core::types::FileRecord;
use serde::Serialize;

use super::result::ChangeKind;

/// Any path containing one of these is a critical change.
pub const CRITICAL_PATHS: &[&str] = &[
    "/etc/passwd",
    "/etc/shadow",
    "/etc/sudoers",
    "/etc/hosts",
    "/bin/",
    "/sbin/",
    "/usr/bin/",
    "/usr/sbin/",
    "/boot/",
    "/etc/systemd/",
    "/etc/cron",
    "/etc/ssh/",
    "/.ssh/",
    "/root/",
    "/home/",
    "/etc/security/",
    "/lib/systemd/",
    "/usr/lib/systemd/",
    "/etc/init.d/",
    "/etc/profile",
    "/etc/bash.bashrc",
    "/.bashrc",
    "/.bash_profile",
    "/.profile",
    "/.zshrc",
];

/// Credential and privilege material: 9 when added or modified, 8 when deleted.
const HIGH_RISK: &[&str] = &[
    "/etc/passwd",
    "/etc/shadow",
    "/etc/sudoers",
    "/bin/",
    "/sbin/",
    "/usr/bin/",
    "/usr/sbin/",
    "/root/",
    "/.ssh/",
];

/// General system and user trees: 6 when added or modified, 5 when deleted.
const ELEVATED: &[&str] = &["/etc/", "/boot/", "/home/"];

const DEFAULT_SEVERITY: u8 = 3;

/// First matching entry names what the path is.
const SUBJECTS: &[(&str, &str)] = &[
    ("/etc/passwd", "User account database"),
    ("/etc/shadow", "Password hash database"),
    ("/etc/sudoers", "Sudo privileges configuration"),
    ("/.ssh/", "SSH configuration or keys"),
    ("/etc/ssh/", "SSH configuration or keys"),
    ("/etc/profile", "Shell startup configuration"),
    ("/etc/bash.bashrc", "Shell startup configuration"),
    ("/.bashrc", "Shell startup configuration"),
    ("/.bash_profile", "Shell startup configuration"),
    ("/.profile", "Shell startup configuration"),
    ("/.zshrc", "Shell startup configuration"),
    ("/etc/systemd/", "Systemd service configuration"),
    ("/lib/systemd/", "Systemd service configuration"),
    ("/etc/cron", "Scheduled task configuration"),
    ("/etc/init.d/", "Init script"),
    ("/etc/security/", "PAM security policy"),
    ("/etc/hosts", "Host name resolution table"),
    ("/boot/", "Boot loader or kernel image"),
    ("/bin/", "System binary"),
    ("/sbin/", "System binary"),
    ("/root/", "Root user directory"),
    ("/home/", "User home directory"),
];

#[derive(Debug, Clone, Serialize)]
pub struct CriticalChange<'a> {
    pub path: &'a str,
    pub change: ChangeKind,
    /// 1 (informational) to 10 (most severe).
    pub severity: u8,
    pub reason: String,
    /// The current record, or the baseline record for deletions.
    pub record: &'a FileRecord,
}

fn matcher() -> Option<&'static AhoCorasick> {
    static MATCHER: OnceLock<Option<AhoCorasick>> = OnceLock::new();
    MATCHER
        .get_or_init(|| match AhoCorasick::new(CRITICAL_PATHS) {
            Ok(ac) => Some(ac),
            Err(e) => {
                tracing::warn!(error = %e, "critical path automaton unavailable; using linear scan");
                None
            }
        })
        .as_ref()
}

pub fn is_critical(path: &str) -> bool {
    match matcher() {
        Some(ac) => ac.is_match(path),
        None => CRITICAL_PATHS.iter().any(|p| path.contains(p)),
    }
}

pub fn severity(path: &str, change: ChangeKind) -> u8 {
    let deleted = change == ChangeKind::Deleted;
    if HIGH_RISK.iter().any(|p| path.contains(p)) {
        if deleted {
            8
        } else {
            9
        }
    } else if ELEVATED.iter().any(|p| path.contains(p)) {
        if deleted {
            5
        } else {
            6
        }
    } else {
        DEFAULT_SEVERITY
    }
}

pub fn reason(path: &str, change: ChangeKind) -> String {
    let subject = SUBJECTS
        .iter()
        .find(|(needle, _)| path.contains(needle))
        .map_or("Critical system path", |(_, subject)| *subject);
    format!("{subject} {change}")
}

/// Score every critical path among `changes`, most severe first; ties in
/// path order.
pub(crate) fn detect<'a, I>(changes: I) -> Vec<CriticalChange<'a>>
where
    I: IntoIterator<Item = (&'a str, ChangeKind, &'a FileRecord)>,
{
    let mut found: Vec<CriticalChange<'a>> = changes
        .into_iter()
        .filter(|(path, _, _)| is_critical(path))
        .map(|(path, change, record)| CriticalChange {
            path,
            change,
            severity: severity(path, change),
            reason: reason(path, change),
            record,
        })
        .collect();
    found.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.path.cmp(b.path)));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_files_score_highest() {
        assert_eq!(severity("/etc/shadow", ChangeKind::Added), 9);
        assert_eq!(severity("/etc/shadow", ChangeKind::Modified), 9);
        assert_eq!(severity("/etc/shadow", ChangeKind::Deleted), 8);
        assert_eq!(severity("/etc/fstab", ChangeKind::Modified), 6);
        assert_eq!(severity("/home/ann/notes", ChangeKind::Deleted), 5);
        assert_eq!(severity("/opt/app/x", ChangeKind::Added), DEFAULT_SEVERITY);
    }

    #[test]
    fn reasons_name_the_subject_and_action() {
        assert_eq!(reason("/etc/shadow", ChangeKind::Added), "Password hash database added");
        assert_eq!(
            reason("/root/.ssh/authorized_keys", ChangeKind::Modified),
            "SSH configuration or keys modified"
        );
        assert_eq!(reason("/usr/sbin/sshd", ChangeKind::Deleted), "System binary deleted");
        assert_eq!(
            reason("/etc/cron.d/job", ChangeKind::Added),
            "Scheduled task configuration added"
        );
    }

    #[test]
    fn only_listed_paths_are_critical() {
        assert!(is_critical("/etc/sudoers.d/ops"));
        assert!(is_critical("/home/ann/.bashrc"));
        assert!(!is_critical("/etc/fstab"));
        assert!(!is_critical("/srv/www/index.html"));
    }
}
