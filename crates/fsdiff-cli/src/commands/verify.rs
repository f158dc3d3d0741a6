use std::path::Path;

use fsdiff_core::config::FsdiffConfig;
use fsdiff_storage::SnapshotStore;

use crate::error::CliError;

/// Structural validation, root digest recomputation, and a full digest
/// tree integrity check. Any failure is an error.
pub fn run(path: &Path, config: &FsdiffConfig) -> Result<(), CliError> {
    let mut snapshot = SnapshotStore::new(config.storage.clone()).load(path)?;
    snapshot.validate()?;

    let recomputed = snapshot.compute_root_digest();
    if recomputed != snapshot.root_digest {
        return Err(CliError::Verification {
            path: path.to_path_buf(),
            reason: format!(
                "stored root digest {} does not match records ({recomputed})",
                snapshot.root_digest
            ),
        });
    }

    let tree = snapshot.rebuild_tree();
    if !tree.verify_integrity() {
        return Err(CliError::Verification {
            path: path.to_path_buf(),
            reason: "digest tree failed integrity check".to_string(),
        });
    }
    let (leaves, depth, tree_root) = (tree.leaf_count(), tree.depth(), tree.root_hash());

    println!("{}: OK", path.display());
    println!("  {}", snapshot.summary());
    println!("  records:     {}", snapshot.len());
    println!("  root digest: {}", snapshot.root_digest);
    println!("  tree root:   {tree_root} ({leaves} leaves, depth {depth})");
    Ok(())
}
