//! Configuration system for fsdiff.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod diff_config;
pub mod fsdiff_config;
pub mod scan_config;
pub mod storage_config;

pub use diff_config::DiffConfig;
pub use fsdiff_config::{CliOverrides, FsdiffConfig};
pub use scan_config::ScanConfig;
pub use storage_config::StorageConfig;
