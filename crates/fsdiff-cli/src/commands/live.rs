use std::path::Path;

use fsdiff_core::config::FsdiffConfig;
use fsdiff_engine::{Differ, Scanner};
use fsdiff_storage::SnapshotStore;

use crate::commands::compare;
use crate::error::CliError;

/// Compare a saved baseline against a fresh in-memory scan of `root`.
/// Nothing is written for the current side.
pub fn run(
    baseline: &Path,
    root: &Path,
    json: bool,
    csv: Option<&Path>,
    config: &FsdiffConfig,
) -> Result<(), CliError> {
    let baseline = SnapshotStore::new(config.storage.clone()).load(baseline)?;

    tracing::info!(root = %root.display(), "scanning current tree for comparison");
    let current = Scanner::new(config.scan.clone()).scan(root)?;

    let result = Differ::new(config.diff.clone()).compare(&baseline, &current);
    compare::render(&result, json, csv, config)
}
