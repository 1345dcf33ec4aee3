//! Default configuration values
//!
//! Provides default configuration instances and the constants behind them.

use super::schema::Config;

pub const TIMEOUT_SECONDS: u64 = 300;
pub const LARGE_OBJECT_THRESHOLD_BYTES: usize = 1_048_576;
pub const RESTART_WARNING_THRESHOLD: u64 = 5;
pub const LOG_LEVEL: &str = "info";
pub const DATABASE_FILE: &str = "kubegraph.db";

/// Accepted `logger.level` values
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert!(config.replace_existing);
        assert_eq!(config.restart_warning_threshold, RESTART_WARNING_THRESHOLD);
    }
}
