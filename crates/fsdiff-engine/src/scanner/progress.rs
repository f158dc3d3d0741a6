//! Periodic progress reporting and resident-memory alerts.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use fsdiff_core::events::{EventDispatcher, MemoryAlertEvent, ScanEventHandler, ScanProgressEvent};
use sysinfo::{Pid, ProcessesToUpdate, System};

use super::stats::LiveStats;

pub(crate) struct ProgressReporter<'a> {
    pub stats: &'a LiveStats,
    pub events: &'a EventDispatcher,
    pub interval: Duration,
    pub alert_threshold: u64,
    pub started: Instant,
}

impl ProgressReporter<'_> {
    /// Tick until `stop` fires or disconnects.
    pub fn run(&self, stop: Receiver<()>) {
        let mut memory = MemorySampler::new();
        self.run_with(stop, || memory.resident_bytes());
    }

    /// Tick loop with the resident-memory source supplied by the caller.
    fn run_with<M>(&self, stop: Receiver<()>, mut resident_bytes: M)
    where
        M: FnMut() -> Option<u64>,
    {
        let mut previous = resident_bytes();
        loop {
            match stop.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }

            let resident = resident_bytes();
            if let (Some(before), Some(now)) = (previous, resident) {
                if now > before.saturating_add(self.alert_threshold) {
                    tracing::warn!(
                        previous_bytes = before,
                        current_bytes = now,
                        threshold_bytes = self.alert_threshold,
                        "resident memory jumped between progress ticks"
                    );
                    self.events.emit_memory_alert(&MemoryAlertEvent {
                        previous_bytes: before,
                        current_bytes: now,
                        threshold_bytes: self.alert_threshold,
                    });
                }
            }
            if resident.is_some() {
                previous = resident;
            }

            let sample = self.stats.sample();
            let elapsed = self.started.elapsed();
            self.events.emit_scan_progress(&ScanProgressEvent {
                files_processed: sample.files,
                dirs_processed: sample.dirs,
                bytes_processed: sample.bytes,
                errors: sample.errors,
                elapsed,
                files_per_second: sample.entries() as f64 / elapsed.as_secs_f64().max(1e-3),
                resident_bytes: resident,
            });
        }
    }
}

struct MemorySampler {
    system: System,
    pid: Option<Pid>,
}

impl MemorySampler {
    fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    fn resident_bytes(&mut self) -> Option<u64> {
        let pid = self.pid?;
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        self.system.process(pid).map(|process| process.memory())
    }
}

/// Logs each progress tick. Registered for verbose scans.
#[derive(Debug, Default)]
pub struct LogProgressHandler;

impl ScanEventHandler for LogProgressHandler {
    fn on_scan_progress(&self, event: &ScanProgressEvent) {
        tracing::info!(
            files = event.files_processed,
            dirs = event.dirs_processed,
            bytes = event.bytes_processed,
            errors = event.errors,
            rate = format_args!("{:.0}/s", event.files_per_second),
            resident_bytes = event.resident_bytes,
            "progress"
        );
    }
}
