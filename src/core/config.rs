/*!
 * Runtime Configuration
 * Timeouts and capacities, overridable from the environment or a JSON file
 */

use super::limits::{DEFAULT_INIT_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS, MAILBOX_CAPACITY};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Runtime configuration for the executive and isolate processes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct RuntimeConfig {
    /// Bound on waiting for a spawned isolate to report initialized
    pub init_timeout_ms: u64,
    /// Bound on a correlated request/response exchange
    pub request_timeout_ms: u64,
    /// Bounded capacity of each per-process mailbox
    pub mailbox_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: DEFAULT_INIT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            mailbox_capacity: MAILBOX_CAPACITY,
        }
    }
}

impl RuntimeConfig {
    /// Build a configuration from defaults plus environment overrides
    ///
    /// Environment variables:
    /// - EXEC_INIT_TIMEOUT_MS
    /// - EXEC_REQUEST_TIMEOUT_MS
    /// - EXEC_MAILBOX_CAPACITY
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_u64("EXEC_INIT_TIMEOUT_MS") {
            config.init_timeout_ms = v;
        }
        if let Some(v) = env_u64("EXEC_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = v;
        }
        if let Some(v) = env_u64("EXEC_MAILBOX_CAPACITY") {
            config.mailbox_capacity = v as usize;
        }
        config
    }

    /// Load a configuration override file (JSON)
    ///
    /// Used by the isolate-process entry point when `args[1]` names an
    /// override path.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    #[inline]
    #[must_use]
    pub const fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    #[inline]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[inline]
    #[must_use]
    pub fn with_init_timeout_ms(mut self, ms: u64) -> Self {
        self.init_timeout_ms = ms;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.init_timeout_ms, DEFAULT_INIT_TIMEOUT_MS);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.mailbox_capacity, MAILBOX_CAPACITY);
        assert_eq!(config.request_timeout(), Duration::from_millis(2_000));
    }

    #[test]
    fn test_load_file_partial_override() {
        let path = std::env::temp_dir().join(format!("exec-config-{}.json", std::process::id()));
        std::fs::write(&path, br#"{"init_timeout_ms": 250}"#).unwrap();

        let config = RuntimeConfig::load_file(&path).unwrap();
        assert_eq!(config.init_timeout_ms, 250);
        // Unspecified fields fall back to defaults
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_file_missing() {
        let result = RuntimeConfig::load_file(Path::new("/nonexistent/exec-config.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
