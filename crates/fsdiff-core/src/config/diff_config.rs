//! Differ configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiffConfig {
    /// Paths excluded from comparison, on top of the built-in defaults.
    pub ignore_patterns: Vec<String>,
    pub verbose: Option<bool>,
    /// Include content digests in rendered output.
    pub show_hashes: Option<bool>,
    /// Omit unchanged summary lines in rendered output.
    pub only_changes: Option<bool>,
    /// Compare every record even when root digests match.
    pub force_full_compare: Option<bool>,
}

impl DiffConfig {
    pub fn effective_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn effective_show_hashes(&self) -> bool {
        self.show_hashes.unwrap_or(false)
    }

    pub fn effective_only_changes(&self) -> bool {
        self.only_changes.unwrap_or(false)
    }

    pub fn effective_force_full_compare(&self) -> bool {
        self.force_full_compare.unwrap_or(false)
    }
}
