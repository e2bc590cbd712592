//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration for local development.

use std::path::PathBuf;
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Interval of the fallback poll loop.
    /// Env: `PARLEY_POLL_INTERVAL_MS`
    /// Default: 3000 ms
    pub poll_interval: Duration,

    /// Whether the push feed is available.  When `false` the feed loop
    /// polls instead; the two are never run together.
    /// Env: `PARLEY_PUSH_ENABLED` (true/false)
    /// Default: `true`
    pub push_enabled: bool,

    /// Explicit database file path.  When unset the store picks the
    /// platform data directory.
    /// Env: `PARLEY_DB_PATH`
    pub database_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(3000),
            push_enabled: true,
            database_path: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PARLEY_POLL_INTERVAL_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                config.poll_interval = Duration::from_millis(ms);
            } else {
                tracing::warn!(value = %val, "Invalid PARLEY_POLL_INTERVAL_MS, using default");
            }
        }

        if let Ok(val) = std::env::var("PARLEY_PUSH_ENABLED") {
            config.push_enabled = val != "false" && val != "0";
        }

        if let Ok(path) = std::env::var("PARLEY_DB_PATH") {
            if !path.is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(3000));
        assert!(config.push_enabled);
        assert!(config.database_path.is_none());
    }
}
