//! Top-level fsdiff configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DiffConfig, ScanConfig, StorageConfig};
use crate::constants::{MAX_BUFFER_SIZE, MAX_CONFIGURED_WORKERS, MIN_BUFFER_SIZE, PROJECT_CONFIG_FILE};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (`CliOverrides`)
/// 2. Environment variables (`FSDIFF_*`)
/// 3. Project config (`fsdiff.toml` in the working root)
/// 4. User config (`~/.fsdiff/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FsdiffConfig {
    pub scan: ScanConfig,
    pub diff: DiffConfig,
    pub storage: StorageConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scan_workers: Option<usize>,
    pub scan_buffer_size: Option<usize>,
    pub scan_verbose: Option<bool>,
    /// Appended to both scan and diff ignore patterns.
    pub extra_ignore: Vec<String>,
    pub compression_level: Option<i32>,
    pub diff_force_full_compare: Option<bool>,
    pub diff_show_hashes: Option<bool>,
    pub diff_only_changes: Option<bool>,
}

impl FsdiffConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(err @ ConfigError::ParseError { .. }) => return Err(err),
                    Err(err) => {
                        tracing::warn!(path = %user_config_path.display(), error = %err, "skipping user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &FsdiffConfig) -> Result<(), ConfigError> {
        if let Some(workers) = config.scan.workers {
            if workers == 0 || workers > MAX_CONFIGURED_WORKERS {
                return Err(invalid(
                    "scan.workers",
                    format!("must be between 1 and {MAX_CONFIGURED_WORKERS}"),
                ));
            }
        }
        if let Some(size) = config.scan.buffer_size {
            if !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&size) {
                return Err(invalid(
                    "scan.buffer_size",
                    format!("must be between {MIN_BUFFER_SIZE} and {MAX_BUFFER_SIZE} bytes"),
                ));
            }
        }
        if config.scan.dispatch_timeout_ms == Some(0) {
            return Err(invalid("scan.dispatch_timeout_ms", "must be greater than 0"));
        }
        if config.scan.progress_interval_secs == Some(0) {
            return Err(invalid("scan.progress_interval_secs", "must be greater than 0"));
        }
        if let Some(level) = config.storage.compression_level {
            if !(1..=22).contains(&level) {
                return Err(invalid("storage.compression_level", "must be between 1 and 22"));
            }
        }
        if config.storage.batch_size == Some(0) {
            return Err(invalid("storage.batch_size", "must be greater than 0"));
        }
        if config.storage.flush_every_batches == Some(0) {
            return Err(invalid("storage.flush_every_batches", "must be greater than 0"));
        }
        for (field, patterns) in [
            ("scan.ignore_patterns", &config.scan.ignore_patterns),
            ("diff.ignore_patterns", &config.diff.ignore_patterns),
        ] {
            for pattern in patterns {
                if pattern.is_empty() {
                    return Err(invalid(field, "patterns must not be empty"));
                }
                if pattern.contains('*') {
                    if let Err(e) = glob::Pattern::new(pattern) {
                        return Err(invalid(field, format!("invalid glob {pattern:?}: {e}")));
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.fsdiff/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored.
    fn merge_toml_file(config: &mut FsdiffConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: FsdiffConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut FsdiffConfig, other: &FsdiffConfig) {
        // Scan
        if other.scan.workers.is_some() {
            base.scan.workers = other.scan.workers;
        }
        if other.scan.buffer_size.is_some() {
            base.scan.buffer_size = other.scan.buffer_size;
        }
        if !other.scan.ignore_patterns.is_empty() {
            base.scan.ignore_patterns = other.scan.ignore_patterns.clone();
        }
        if other.scan.verbose.is_some() {
            base.scan.verbose = other.scan.verbose;
        }
        if other.scan.dispatch_timeout_ms.is_some() {
            base.scan.dispatch_timeout_ms = other.scan.dispatch_timeout_ms;
        }
        if other.scan.progress_interval_secs.is_some() {
            base.scan.progress_interval_secs = other.scan.progress_interval_secs;
        }
        if other.scan.memory_alert_mb.is_some() {
            base.scan.memory_alert_mb = other.scan.memory_alert_mb;
        }
        if other.scan.collect_security_metadata.is_some() {
            base.scan.collect_security_metadata = other.scan.collect_security_metadata;
        }

        // Diff
        if !other.diff.ignore_patterns.is_empty() {
            base.diff.ignore_patterns = other.diff.ignore_patterns.clone();
        }
        if other.diff.verbose.is_some() {
            base.diff.verbose = other.diff.verbose;
        }
        if other.diff.show_hashes.is_some() {
            base.diff.show_hashes = other.diff.show_hashes;
        }
        if other.diff.only_changes.is_some() {
            base.diff.only_changes = other.diff.only_changes;
        }
        if other.diff.force_full_compare.is_some() {
            base.diff.force_full_compare = other.diff.force_full_compare;
        }

        // Storage
        if other.storage.compression_level.is_some() {
            base.storage.compression_level = other.storage.compression_level;
        }
        if other.storage.batch_size.is_some() {
            base.storage.batch_size = other.storage.batch_size;
        }
        if other.storage.flush_every_batches.is_some() {
            base.storage.flush_every_batches = other.storage.flush_every_batches;
        }
    }

    /// Apply `FSDIFF_*` environment variables. Unparseable values are ignored.
    fn apply_env_overrides(config: &mut FsdiffConfig) {
        if let Ok(val) = std::env::var("FSDIFF_SCAN_WORKERS") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.workers = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FSDIFF_SCAN_BUFFER_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.buffer_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FSDIFF_SCAN_VERBOSE") {
            if let Ok(v) = val.parse::<bool>() {
                config.scan.verbose = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FSDIFF_SCAN_DISPATCH_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.scan.dispatch_timeout_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FSDIFF_STORAGE_COMPRESSION_LEVEL") {
            if let Ok(v) = val.parse::<i32>() {
                config.storage.compression_level = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FSDIFF_DIFF_FORCE_FULL_COMPARE") {
            if let Ok(v) = val.parse::<bool>() {
                config.diff.force_full_compare = Some(v);
            }
        }
        if let Ok(val) = std::env::var("FSDIFF_DIFF_SHOW_HASHES") {
            if let Ok(v) = val.parse::<bool>() {
                config.diff.show_hashes = Some(v);
            }
        }
    }

    fn apply_cli_overrides(config: &mut FsdiffConfig, cli: &CliOverrides) {
        if let Some(v) = cli.scan_workers {
            config.scan.workers = Some(v);
        }
        if let Some(v) = cli.scan_buffer_size {
            config.scan.buffer_size = Some(v);
        }
        if let Some(v) = cli.scan_verbose {
            config.scan.verbose = Some(v);
            config.diff.verbose = Some(v);
        }
        if !cli.extra_ignore.is_empty() {
            config.scan.ignore_patterns.extend(cli.extra_ignore.iter().cloned());
            config.diff.ignore_patterns.extend(cli.extra_ignore.iter().cloned());
        }
        if let Some(v) = cli.compression_level {
            config.storage.compression_level = Some(v);
        }
        if let Some(v) = cli.diff_force_full_compare {
            config.diff.force_full_compare = Some(v);
        }
        if let Some(v) = cli.diff_show_hashes {
            config.diff.show_hashes = Some(v);
        }
        if let Some(v) = cli.diff_only_changes {
            config.diff.only_changes = Some(v);
        }
    }

    /// Serialize the config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.into(),
    }
}

fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".fsdiff"))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
