use std::path::Path;

use fsdiff_core::config::FsdiffConfig;
use fsdiff_engine::Scanner;
use fsdiff_storage::SnapshotStore;

use crate::error::CliError;
use crate::report::human_size;

pub fn run(root: &Path, output: &Path, stream: bool, config: &FsdiffConfig) -> Result<(), CliError> {
    let scanner = Scanner::new(config.scan.clone());

    let (stats, root_digest, written) = if stream {
        let summary = scanner.scan_to_file(root, output, &config.storage)?;
        (summary.stats, summary.root_digest, summary.compressed_bytes)
    } else {
        let snapshot = scanner.scan(root)?;
        let summary = SnapshotStore::new(config.storage.clone()).save(&snapshot, output)?;
        (snapshot.stats, snapshot.root_digest, summary.compressed_bytes)
    };

    println!(
        "Scanned {}: {} files, {} directories, {} in {:.1}s",
        root.display(),
        stats.file_count,
        stats.dir_count,
        human_size(stats.total_size),
        stats.scan_duration.as_secs_f64()
    );
    if stats.error_count > 0 {
        println!("{} entries could not be read (see FSDIFF_LOG=debug)", stats.error_count);
    }
    println!("Root digest: {root_digest}");
    println!("Wrote {} ({})", output.display(), human_size(written));
    Ok(())
}
