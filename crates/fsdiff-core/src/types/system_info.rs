//! Host description captured alongside every snapshot.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::serde_helpers::duration_millis;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub os: String,
    pub arch: String,
    pub distro: String,
    pub kernel: String,
    /// When the scan started.
    pub timestamp: DateTime<Utc>,
    pub scan_root: String,
    #[serde(with = "duration_millis")]
    pub scan_duration: Duration,
    pub cpu_count: usize,
}

impl SystemInfo {
    /// A placeholder with only the scan root and timestamp filled in.
    pub fn for_root(scan_root: impl Into<String>) -> Self {
        Self {
            hostname: "unknown".to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            distro: "unknown".to_string(),
            kernel: "unknown".to_string(),
            timestamp: Utc::now(),
            scan_root: scan_root.into(),
            scan_duration: Duration::ZERO,
            cpu_count: 0,
        }
    }
}
