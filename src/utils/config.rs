// src/utils/config.rs
//! Configuration for the resilience layer
//!
//! Loaded from an optional `netshim` config file plus `NETSHIM_`-prefixed
//! environment variables; every field has a usable default so the layer
//! works with no configuration at all.

use crate::utils::errors::{Result, ShimError};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Resilience layer configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ShimConfig {
    /// Base origin of the dashboard REST API, prepended to relative paths
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds; expiry aborts the request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Query marker identifying bundler-served module assets
    #[serde(default = "default_cache_bust_marker")]
    pub cache_bust_marker: String,

    /// Drop known-noise WARN/ERROR log events
    #[serde(default = "default_suppress_noise")]
    pub suppress_noise: bool,

    /// Buffered capacity of the dashboard event bus
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_cache_bust_marker() -> String {
    "?t=".to_string()
}

fn default_suppress_noise() -> bool {
    true
}

fn default_event_bus_capacity() -> usize {
    256
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            cache_bust_marker: default_cache_bust_marker(),
            suppress_noise: default_suppress_noise(),
            event_bus_capacity: default_event_bus_capacity(),
        }
    }
}

impl ShimConfig {
    /// Load configuration from `netshim.*` (if present) and the environment
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("netshim").required(false))
            .add_source(Environment::with_prefix("NETSHIM"))
            .build()
            .map_err(|e| ShimError::ConfigError(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| ShimError::ConfigError(e.to_string()))
    }

    /// Load configuration from an explicit file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(|e| ShimError::ConfigError(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| ShimError::ConfigError(e.to_string()))
    }

    /// Per-request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ShimConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.request_timeout(), Duration::from_millis(5000));
        assert!(config.suppress_noise);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "base_url = \"http://localhost:3001\"").unwrap();
        writeln!(file, "request_timeout_ms = 1200").unwrap();
        file.flush().unwrap();

        let config = ShimConfig::load_from(file.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:3001");
        assert_eq!(config.request_timeout_ms, 1200);
        // Unspecified fields fall back to defaults
        assert_eq!(config.cache_bust_marker, "?t=");
        assert_eq!(config.event_bus_capacity, 256);
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let result = ShimConfig::load_from(Path::new("/nonexistent/netshim.toml"));
        assert!(matches!(result, Err(ShimError::ConfigError(_))));
    }
}
