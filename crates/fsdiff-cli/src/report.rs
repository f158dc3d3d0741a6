//! Human-readable and CSV renderings of a diff result.

use std::io::{self, Write};

use fsdiff_core::config::DiffConfig;
use fsdiff_engine::{ChangeKind, DiffResult, ExportRow};

pub fn human_size(bytes: u64) -> String {
    bytesize::to_string(bytes, true)
}

fn signed_size(delta: i64) -> String {
    let sign = if delta < 0 { "-" } else { "+" };
    format!("{sign}{}", human_size(delta.unsigned_abs()))
}

pub fn render_text<W: Write>(out: &mut W, result: &DiffResult<'_>, config: &DiffConfig) -> io::Result<()> {
    let summary = &result.summary;
    let baseline = &result.baseline.system_info;
    let current = &result.current.system_info;

    writeln!(out, "Baseline: {} on {} ({})", baseline.scan_root, baseline.hostname, baseline.timestamp.to_rfc3339())?;
    writeln!(out, "Current:  {} on {} ({})", current.scan_root, current.hostname, current.timestamp.to_rfc3339())?;
    writeln!(out)?;

    if summary.fast_path {
        writeln!(out, "Root digests match; no changes.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{} added, {} modified, {} deleted ({} total, net {})",
        summary.added_count,
        summary.modified_count,
        summary.deleted_count,
        summary.total_changes,
        signed_size(summary.size_delta)
    )?;
    if summary.ignored_paths > 0 {
        writeln!(out, "{} paths ignored", summary.ignored_paths)?;
    }

    let critical = result.critical_changes();
    if !critical.is_empty() {
        writeln!(out)?;
        writeln!(out, "CRITICAL ({})", critical.len())?;
        for change in critical {
            writeln!(out, "  [{}] {:<8} {}  {}", change.severity, change.change, change.path, change.reason)?;
        }
    }

    let show_hashes = config.effective_show_hashes();
    let only_changes = config.effective_only_changes();
    for kind in ChangeKind::ALL {
        let paths = result.changes_by_type(kind);
        if paths.is_empty() && only_changes {
            continue;
        }
        writeln!(out)?;
        writeln!(out, "{} ({})", section_title(kind), paths.len())?;
        if paths.is_empty() {
            writeln!(out, "  (none)")?;
            continue;
        }
        for path in paths {
            match kind {
                ChangeKind::Modified => {
                    let detail = &result.modified[path];
                    writeln!(out, "  ~ {path}: {}", detail.changes.join(", "))?;
                }
                ChangeKind::Added | ChangeKind::Deleted => {
                    let record = if kind == ChangeKind::Added {
                        result.added[path]
                    } else {
                        result.deleted[path]
                    };
                    let marker = if kind == ChangeKind::Added { '+' } else { '-' };
                    let suffix = if record.is_dir { "/" } else { "" };
                    write!(out, "  {marker} {path}{suffix}")?;
                    if !record.is_dir {
                        write!(out, " ({})", human_size(record.size))?;
                    }
                    if show_hashes && record.has_content_digest() {
                        write!(out, " {}", record.content_digest)?;
                    }
                    writeln!(out)?;
                }
            }
        }
    }
    Ok(())
}

fn section_title(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added => "Added",
        ChangeKind::Modified => "Modified",
        ChangeKind::Deleted => "Deleted",
    }
}

/// RFC 4180 CSV: header row, then one row per change.
pub fn write_csv<W: Write>(out: &mut W, rows: &[ExportRow]) -> io::Result<()> {
    writeln!(out, "{}", ExportRow::HEADERS.join(","))?;
    for row in rows {
        let fields: Vec<String> = row.fields().iter().map(|f| csv_field(f)).collect();
        writeln!(out, "{}", fields.join(","))?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
