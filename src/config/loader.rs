//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        Self::load_from(&paths::root_config_path())
    }

    /// Same as [`ConfigLoader::load`] with an explicit root config file
    pub fn load_from(path: &Path) -> Result<Config> {
        let mut config = Self::load_defaults();

        if path.exists() {
            config = Self::load_file(path)?;
        }

        config = Self::apply_env_overrides(config);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// This performs strict validation - it will fail on:
    /// - Invalid YAML syntax
    /// - Invalid value types
    /// - Out of range values
    /// - File read errors
    pub fn validate() -> Result<()> {
        let root_path = paths::root_config_path();
        if root_path.exists() {
            Self::load_file(&root_path)?
                .validate()
                .with_context(|| format!("Invalid config file: {}", root_path.display()))?;
        }

        let _ = Self::load().context("Failed to load merged configuration")?;

        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        // KUBEGRAPH_DB override
        if let Ok(db) = std::env::var("KUBEGRAPH_DB") {
            config.database_path = Some(PathBuf::from(db));
        }

        // KUBEGRAPH_STRICT override
        if let Ok(strict) = std::env::var("KUBEGRAPH_STRICT") {
            if let Ok(val) = strict.parse::<bool>() {
                config.strict = val;
            }
        }

        // KUBEGRAPH_BATCH_SIZE override
        if let Ok(batch_size) = std::env::var("KUBEGRAPH_BATCH_SIZE") {
            if let Ok(val) = batch_size.parse::<usize>() {
                config.batch_size = val;
            }
        }

        // KUBEGRAPH_LOG_LEVEL override
        if let Ok(level) = std::env::var("KUBEGRAPH_LOG_LEVEL") {
            config.logger.level = level;
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}
