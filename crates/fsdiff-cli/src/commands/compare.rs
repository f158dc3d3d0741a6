use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use fsdiff_core::config::FsdiffConfig;
use fsdiff_engine::{DiffResult, Differ};
use fsdiff_storage::SnapshotStore;

use crate::error::CliError;
use crate::report;

pub fn run(
    baseline: &Path,
    current: &Path,
    json: bool,
    csv: Option<&Path>,
    config: &FsdiffConfig,
) -> Result<(), CliError> {
    let store = SnapshotStore::new(config.storage.clone());
    let baseline = store.load(baseline)?;
    let current = store.load(current)?;

    let result = Differ::new(config.diff.clone()).compare(&baseline, &current);
    render(&result, json, csv, config)
}

/// Print `result` to stdout as text or JSON, then write the CSV export if
/// one was requested.
pub fn render(
    result: &DiffResult<'_>,
    json: bool,
    csv: Option<&Path>,
    config: &FsdiffConfig,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = if json {
        serde_json::to_writer_pretty(&mut out, result)?;
        writeln!(out)
    } else {
        report::render_text(&mut out, result, &config.diff)
    };
    written.map_err(|source| CliError::Output {
        path: "<stdout>".into(),
        source,
    })?;

    if let Some(path) = csv {
        let output_error = |source: io::Error| CliError::Output {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(output_error)?;
        let mut writer = BufWriter::new(file);
        report::write_csv(&mut writer, &result.export_rows()).map_err(output_error)?;
        writer.flush().map_err(output_error)?;
        tracing::info!(path = %path.display(), rows = result.summary.total_changes, "wrote CSV export");
    }
    Ok(())
}
