//! Single-threaded directory traversal feeding the job queue.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use fsdiff_core::events::{EventDispatcher, ScanErrorEvent};
use fsdiff_core::traits::{Cancellable, CancellationToken};
use ignore::WalkBuilder;

use super::stats::LiveStats;
use super::worker::Job;
use crate::filter::PathFilter;

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct WalkOutcome {
    pub dispatched: u64,
    pub cancelled: bool,
    pub workers_gone: bool,
}

pub(crate) struct Walker<'a> {
    pub filter: Arc<PathFilter>,
    pub dispatch_timeout: Duration,
    pub stats: &'a LiveStats,
    pub events: &'a EventDispatcher,
    pub cancel: &'a CancellationToken,
    pub abort: &'a CancellationToken,
}

impl Walker<'_> {
    /// Walk `root`, sending every entry the filter keeps. Excluded
    /// directories are pruned with their whole subtree; the root itself is
    /// never filtered.
    pub fn run(&self, root: &Path, jobs: &Sender<Job>) -> WalkOutcome {
        let filter = Arc::clone(&self.filter);
        let walk = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| entry.depth() == 0 || !filter.should_ignore_path(entry.path()))
            .build();

        let mut outcome = WalkOutcome::default();
        for entry in walk {
            if self.cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }
            if self.abort.is_cancelled() {
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = error_path(&err).unwrap_or_else(|| root.to_path_buf());
                    self.soft_error(path, err.to_string());
                    continue;
                }
            };

            match jobs.send_timeout(Job { path: entry.into_path() }, self.dispatch_timeout) {
                Ok(()) => outcome.dispatched += 1,
                Err(SendTimeoutError::Timeout(job)) => {
                    self.stats.add_skipped();
                    tracing::warn!(
                        path = %job.path.display(),
                        timeout_ms = self.dispatch_timeout.as_millis() as u64,
                        "worker pool saturated; skipping path"
                    );
                    self.events.emit_scan_error(&ScanErrorEvent {
                        path: job.path,
                        message: "skipped: worker pool saturated".to_string(),
                    });
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    outcome.workers_gone = true;
                    break;
                }
            }
        }
        outcome
    }

    fn soft_error(&self, path: PathBuf, message: String) {
        self.stats.add_error();
        tracing::debug!(path = %path.display(), error = %message, "walk error");
        self.events.emit_scan_error(&ScanErrorEvent { path, message });
    }
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        _ => None,
    }
}
