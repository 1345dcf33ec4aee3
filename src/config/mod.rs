//! Configuration system for kubegraph
//!
//! Layered configuration: built-in defaults, a root YAML file, then
//! `KUBEGRAPH_*` environment overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, LoggerConfig};

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "databasePath" => Ok(config.database_path().display().to_string()),
        "strict" => Ok(config.strict.to_string()),
        "batchSize" => Ok(config.batch_size.to_string()),
        "replaceExisting" => Ok(config.replace_existing.to_string()),
        "parallelDetection" => Ok(config.parallel_detection.to_string()),
        "timeoutSeconds" => Ok(config.timeout_seconds.to_string()),
        "largeObjectThresholdBytes" => Ok(config.large_object_threshold_bytes.to_string()),
        "restartWarningThreshold" => Ok(config.restart_warning_threshold.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "databasePath" => {
            if value.is_empty() {
                config.database_path = None;
            } else {
                config.database_path = Some(value.into());
            }
        }
        "strict" => {
            config.strict = value.parse().context("strict must be 'true' or 'false'")?;
        }
        "batchSize" => {
            config.batch_size = value.parse().context("batchSize must be a number")?;
        }
        "replaceExisting" => {
            config.replace_existing = value
                .parse()
                .context("replaceExisting must be 'true' or 'false'")?;
        }
        "parallelDetection" => {
            config.parallel_detection = value
                .parse()
                .context("parallelDetection must be 'true' or 'false'")?;
        }
        "timeoutSeconds" => {
            config.timeout_seconds = value
                .parse()
                .context("timeoutSeconds must be a number")?;
        }
        "largeObjectThresholdBytes" => {
            config.large_object_threshold_bytes = value
                .parse()
                .context("largeObjectThresholdBytes must be a number")?;
        }
        "restartWarningThreshold" => {
            config.restart_warning_threshold = value
                .parse()
                .context("restartWarningThreshold must be a number")?;
        }
        "logger.level" => {
            config.logger.level = value.to_lowercase();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut config = Config::default();
        set_config_value(&mut config, "batchSize", "50").unwrap();
        set_config_value(&mut config, "logger.level", "DEBUG").unwrap();
        assert_eq!(get_config_value(&config, "batchSize").unwrap(), "50");
        assert_eq!(get_config_value(&config, "logger.level").unwrap(), "debug");
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(set_config_value(&mut config, "strict", "maybe").is_err());
        assert!(set_config_value(&mut config, "timeoutSeconds", "0").is_err());
        assert!(set_config_value(&mut config, "ui.skin", "dark").is_err());
    }

    #[test]
    fn test_unknown_key() {
        assert!(get_config_value(&Config::default(), "readOnly").is_err());
    }
}
