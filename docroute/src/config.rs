//! Mock API configuration, loaded from TOML.
//!
//! ```toml
//! base_path = "/api"
//! collections = ["posts", "comments"]
//! seed = "fixtures/seed.json"
//!
//! [latency]
//! min_ms = 50
//! max_ms = 250
//! ```

use serde::Deserialize;
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use docroute_core::error::DocumentStoreError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Seed file is not valid JSON: {0}")]
    Seed(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    Store(#[from] DocumentStoreError),
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Simulated network delay, sampled uniformly per request.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LatencyConfig {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LatencyConfig {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn fixed(ms: u64) -> Self {
        Self { min_ms: ms, max_ms: ms }
    }

    pub fn range(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }

    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }

        Duration::from_millis(fastrand::u64(self.min_ms..=self.max_ms))
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MockApiConfig {
    /// Prefix stripped from request paths before routing (e.g. `/api`).
    pub base_path: Option<String>,
    pub latency: LatencyConfig,
    /// Collections created at startup if missing.
    pub collections: Vec<String>,
    /// JSON snapshot imported at startup.
    pub seed: Option<PathBuf>,
}

impl MockApiConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: MockApiConfig = toml::from_str(content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;

        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.latency.min_ms > self.latency.max_ms {
            return Err(ConfigError::Validation(format!(
                "latency.min_ms ({}) exceeds latency.max_ms ({})",
                self.latency.min_ms, self.latency.max_ms
            )));
        }

        if let Some(base) = &self.base_path {
            if !base.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "base_path must start with '/', got {base:?}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = MockApiConfig::from_toml_str(
            r#"
            base_path = "/api"
            collections = ["posts", "comments"]
            seed = "seed.json"

            [latency]
            min_ms = 10
            max_ms = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.base_path.as_deref(), Some("/api"));
        assert_eq!(config.collections, vec!["posts", "comments"]);
        assert_eq!(config.seed, Some(PathBuf::from("seed.json")));
        assert_eq!(config.latency, LatencyConfig::range(10, 20));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = MockApiConfig::from_toml_str("").unwrap();

        assert_eq!(config, MockApiConfig::default());
        assert!(config.latency.is_zero());
    }

    #[test]
    fn rejects_inverted_latency_and_relative_base() {
        assert!(matches!(
            MockApiConfig::from_toml_str("[latency]\nmin_ms = 5\nmax_ms = 1"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            MockApiConfig::from_toml_str("base_path = \"api\""),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            MockApiConfig::from_toml_str("unknown = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn latency_samples_stay_in_range() {
        let latency = LatencyConfig::range(5, 8);

        for _ in 0..100 {
            let sample = latency.sample();
            assert!(sample >= Duration::from_millis(5) && sample <= Duration::from_millis(8));
        }

        assert_eq!(LatencyConfig::fixed(3).sample(), Duration::from_millis(3));
    }
}
