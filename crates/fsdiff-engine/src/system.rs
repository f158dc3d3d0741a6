//! Host description recorded in each snapshot.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use fsdiff_core::types::SystemInfo;
use sysinfo::System;

const UNKNOWN: &str = "unknown";

/// Describe this host for a scan of `scan_root`. The duration is filled in
/// once the scan finishes.
pub fn collect_system_info(scan_root: &Path) -> SystemInfo {
    SystemInfo {
        hostname: System::host_name().unwrap_or_else(|| UNKNOWN.to_string()),
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        distro: System::long_os_version()
            .or_else(System::name)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| UNKNOWN.to_string()),
        timestamp: Utc::now(),
        scan_root: scan_root.display().to_string(),
        scan_duration: Duration::ZERO,
        cpu_count: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_current_host() {
        let info = collect_system_info(Path::new("/srv/data"));
        assert_eq!(info.scan_root, "/srv/data");
        assert_eq!(info.os, std::env::consts::OS);
        assert!(info.cpu_count >= 1);
        assert!(!info.hostname.is_empty());
        assert_eq!(info.scan_duration, Duration::ZERO);
    }
}
