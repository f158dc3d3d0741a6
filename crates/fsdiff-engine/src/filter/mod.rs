//! PathFilter: one exclusion policy shared by the scanner and the differ.
//!
//! User patterns are tried rule by rule, first match wins:
//! exact, path component, glob (base name or full path), prefix, suffix,
//! substring. Built-in defaults are anchored subtree, ancestor-glob, and
//! component rules so they never catch unrelated paths by substring.

pub mod defaults;

use std::path::{Path, MAIN_SEPARATOR};

use glob::{MatchOptions, Pattern};

pub use defaults::{DEFAULT_IGNORE_COMPONENTS, DEFAULT_IGNORE_GLOBS, DEFAULT_IGNORE_SUBTREES};

/// Which rule excluded a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Exact,
    Component,
    Glob,
    Prefix,
    Suffix,
    Substring,
    /// A built-in default.
    Default,
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct UserPattern {
    raw: String,
    /// `None` when the pattern has no `*` or failed to compile.
    glob: Option<Pattern>,
}

#[derive(Debug, Clone)]
enum DefaultRule {
    Subtree(&'static str),
    AncestorGlob(Pattern),
    Component(&'static str),
}

impl DefaultRule {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Subtree(root) => {
                path == *root
                    || (path.starts_with(root) && path[root.len()..].starts_with('/'))
            }
            Self::AncestorGlob(pattern) => ancestors(path)
                .any(|candidate| pattern.matches_with(candidate, GLOB_OPTIONS)),
            Self::Component(name) => components(path).any(|c| c == *name),
        }
    }
}

/// Decides whether a path is excluded from scanning or diffing.
#[derive(Debug, Clone)]
pub struct PathFilter {
    patterns: Vec<UserPattern>,
    defaults: Vec<DefaultRule>,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new::<&str>(&[])
    }
}

impl PathFilter {
    /// Built-in defaults plus `patterns`.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| !p.is_empty())
            .map(|raw| {
                let glob = if raw.contains('*') {
                    match Pattern::new(raw) {
                        Ok(pattern) => Some(pattern),
                        Err(e) => {
                            tracing::warn!(pattern = raw, error = %e, "invalid glob; using literal rules only");
                            None
                        }
                    }
                } else {
                    None
                };
                UserPattern {
                    raw: raw.to_string(),
                    glob,
                }
            })
            .collect();

        let mut defaults: Vec<DefaultRule> = DEFAULT_IGNORE_SUBTREES
            .iter()
            .copied()
            .map(DefaultRule::Subtree)
            .collect();
        defaults.extend(
            DEFAULT_IGNORE_GLOBS
                .iter()
                .filter_map(|raw| Pattern::new(raw).ok())
                .map(DefaultRule::AncestorGlob),
        );
        defaults.extend(
            DEFAULT_IGNORE_COMPONENTS
                .iter()
                .copied()
                .map(DefaultRule::Component),
        );

        Self { patterns, defaults }
    }

    /// Like [`new`](Self::new), but drops every built-in rule that would
    /// exclude `root` itself, so a tree under `/tmp` can still be scanned.
    pub fn for_root<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Self {
        let mut filter = Self::new(patterns);
        let root = root.to_string_lossy();
        let root = root.trim_end_matches('/');
        let before = filter.defaults.len();
        filter.defaults.retain(|rule| !rule.matches(root));
        let dropped = before - filter.defaults.len();
        if dropped > 0 {
            tracing::debug!(root, dropped, "scan root lies inside default exclusions");
        }
        filter
    }

    pub fn should_ignore(&self, path: &str) -> bool {
        self.matched_rule(path).is_some()
    }

    pub fn should_ignore_path(&self, path: &Path) -> bool {
        self.should_ignore(&path.to_string_lossy())
    }

    /// The first rule excluding `path`, if any.
    pub fn matched_rule(&self, path: &str) -> Option<MatchRule> {
        if self.defaults.iter().any(|rule| rule.matches(path)) {
            return Some(MatchRule::Default);
        }
        self.patterns.iter().find_map(|pattern| pattern.matches(path))
    }

    pub fn user_pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

impl UserPattern {
    fn matches(&self, path: &str) -> Option<MatchRule> {
        let raw = self.raw.as_str();
        if path == raw {
            return Some(MatchRule::Exact);
        }
        if components(path).any(|c| c == raw) {
            return Some(MatchRule::Component);
        }
        if let Some(glob) = &self.glob {
            let base = components(path).last().unwrap_or(path);
            if glob.matches_with(base, GLOB_OPTIONS) || glob.matches_with(path, GLOB_OPTIONS) {
                return Some(MatchRule::Glob);
            }
        }
        if path.starts_with(raw) {
            return Some(MatchRule::Prefix);
        }
        if path.ends_with(raw) {
            return Some(MatchRule::Suffix);
        }
        if path.contains(raw) {
            return Some(MatchRule::Substring);
        }
        None
    }
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', MAIN_SEPARATOR]).filter(|c| !c.is_empty())
}

/// `path` and each of its slash-delimited ancestors, longest first.
fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    std::iter::once(path).chain(
        path.char_indices()
            .rev()
            .filter(|&(i, c)| c == '/' && i > 0)
            .map(move |(i, _)| &path[..i]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_rules_in_order() {
        let filter = PathFilter::new(&["/srv/app/secret", ".cache", "*.log", "/srv/tmp", ".bak", "scratch"]);
        assert_eq!(filter.matched_rule("/srv/app/secret"), Some(MatchRule::Exact));
        assert_eq!(filter.matched_rule("/srv/x/.cache/y"), Some(MatchRule::Component));
        assert_eq!(filter.matched_rule("/srv/app/out.log"), Some(MatchRule::Glob));
        assert_eq!(filter.matched_rule("/srv/tmpfiles"), Some(MatchRule::Prefix));
        assert_eq!(filter.matched_rule("/srv/app/db.bak"), Some(MatchRule::Suffix));
        assert_eq!(filter.matched_rule("/srv/my-scratch-dir/f"), Some(MatchRule::Substring));
        assert_eq!(filter.matched_rule("/srv/app/main.rs"), None);
    }

    #[test]
    fn glob_star_stays_within_one_component() {
        let filter = PathFilter::new(&["/data/*/cache"]);
        assert!(filter.should_ignore("/data/a/cache"));
        assert_eq!(filter.matched_rule("/data/a/b/cache"), None);
    }

    #[test]
    fn defaults_are_anchored() {
        let filter = PathFilter::default();
        assert!(filter.should_ignore("/proc"));
        assert!(filter.should_ignore("/proc/1/status"));
        assert!(!filter.should_ignore("/procedures/a"));
        assert!(!filter.should_ignore("/srv/tmp/a"));
        assert!(filter.should_ignore("/home/ann/.cache/fontconfig/x"));
        assert!(!filter.should_ignore("/home/ann/.cacherc"));
        assert!(filter.should_ignore("/work/repo/.git/HEAD"));
        assert!(!filter.should_ignore("/work/repo/.github/ci.yml"));
    }

    #[test]
    fn root_inside_default_subtree_is_exempt() {
        let filter = PathFilter::for_root(Path::new("/tmp/fixture"), &["skip"]);
        assert!(!filter.should_ignore("/tmp/fixture/a.txt"));
        assert!(filter.should_ignore("/tmp/fixture/skip"));
        assert!(filter.should_ignore("/proc/self"));
    }

    #[test]
    fn invalid_glob_falls_back_to_literal_rules() {
        let filter = PathFilter::new(&["[*"]);
        assert!(filter.should_ignore("/a/[*/b"));
        assert!(!filter.should_ignore("/a/b"));
    }

    #[test]
    fn empty_patterns_are_dropped() {
        let filter = PathFilter::new(&["", "*.log", "", ".bak"]);
        assert_eq!(filter.user_pattern_count(), 2);
        assert_eq!(PathFilter::default().user_pattern_count(), 0);
    }

    #[test]
    fn ancestors_walk_upward() {
        let all: Vec<&str> = ancestors("/a/b/c").collect();
        assert_eq!(all, vec!["/a/b/c", "/a/b", "/a"]);
    }
}
