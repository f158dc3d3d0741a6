//! Built-in exclusions, always applied in addition to user patterns.

/// Virtual, volatile, and cache trees. A rule covers the path itself and
/// everything below it.
pub const DEFAULT_IGNORE_SUBTREES: &[&str] = &[
    "/proc",
    "/sys",
    "/dev",
    "/tmp",
    "/var/tmp",
    "/run",
    "/var/run",
    "/var/log",
    "/var/cache",
    "/var/lib/dhcp",
];

/// Per-user caches. Matched against the path and each of its ancestors.
pub const DEFAULT_IGNORE_GLOBS: &[&str] = &[
    "/home/*/.cache",
    "/home/*/.local/share/Trash",
    "/home/*/.mozilla/firefox/*/Cache",
    "/home/*/.config/google-chrome/*/Cache",
];

/// Version control metadata and build artifacts, matched as whole path
/// components anywhere in the tree.
pub const DEFAULT_IGNORE_COMPONENTS: &[&str] = &[
    // Version control
    ".git",
    ".svn",
    ".hg",
    ".bzr",
    // Dependency and build caches
    "node_modules",
    "__pycache__",
    ".tox",
    ".gradle",
    ".pytest_cache",
    ".mypy_cache",
];
