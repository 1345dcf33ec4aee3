//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults;
use super::paths;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// SQLite database file (defaults to `<data dir>/kubegraph.db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Abort a run on the first malformed record
    #[serde(default)]
    pub strict: bool,

    /// Resources per persistence commit; 0 commits the whole run at once
    #[serde(default)]
    pub batch_size: usize,

    /// Remove previous runs' resources and relationships on write
    #[serde(default = "default_true")]
    pub replace_existing: bool,

    /// Run detectors across resources on the worker pool
    #[serde(default = "default_true")]
    pub parallel_detection: bool,

    /// Upper bound for a whole run
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// ConfigMap/Secret payload size above which a warning is raised
    #[serde(default = "default_large_object_threshold")]
    pub large_object_threshold_bytes: usize,

    /// Container restart count above which a warning is raised
    #[serde(default = "default_restart_warning_threshold")]
    pub restart_warning_threshold: u64,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Config {
    /// Database path with the default applied
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(paths::default_database_path)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("timeoutSeconds must be greater than 0"));
        }
        if !defaults::LOG_LEVELS.contains(&self.logger.level.to_lowercase().as_str()) {
            return Err(anyhow::anyhow!(
                "logger.level must be one of {}, got '{}'",
                defaults::LOG_LEVELS.join(", "),
                self.logger.level
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    defaults::TIMEOUT_SECONDS
}

fn default_large_object_threshold() -> usize {
    defaults::LARGE_OBJECT_THRESHOLD_BYTES
}

fn default_restart_warning_threshold() -> u64 {
    defaults::RESTART_WARNING_THRESHOLD
}

fn default_log_level() -> String {
    defaults::LOG_LEVEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            strict: false,
            batch_size: 0,
            replace_existing: default_true(),
            parallel_detection: default_true(),
            timeout_seconds: default_timeout_seconds(),
            large_object_threshold_bytes: default_large_object_threshold(),
            restart_warning_threshold: default_restart_warning_threshold(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
