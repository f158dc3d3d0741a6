//! ScanEventHandler trait.

use super::types::*;

/// Receives scan and diff lifecycle events. All methods default to no-ops,
/// so implementors override only what they need.
///
/// Progress and error events arrive from background threads.
pub trait ScanEventHandler: Send + Sync {
    fn on_scan_started(&self, _event: &ScanStartedEvent) {}
    fn on_scan_progress(&self, _event: &ScanProgressEvent) {}
    fn on_memory_alert(&self, _event: &MemoryAlertEvent) {}
    fn on_scan_error(&self, _event: &ScanErrorEvent) {}
    fn on_scan_complete(&self, _event: &ScanCompleteEvent) {}
    fn on_diff_complete(&self, _event: &DiffCompleteEvent) {}
}
