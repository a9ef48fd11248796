//! Configuration loading for the tooling.
//!
//! One [`ToolingConfig`] is constructed at process start -- from a YAML
//! file, environment overrides, or defaults -- and passed explicitly to
//! every component. No component reads credentials on its own, so tests
//! substitute fakes by constructing the struct directly.
//!
//! Environment overrides (applied after the file):
//! - `SERENISSIMA_STORE_API_KEY` overrides `store.api_key`
//! - `SERENISSIMA_STORE_BASE_ID` overrides `store.base_id`
//! - `SERENISSIMA_STORE_URL` overrides `store.base_url`
//! - `SERENISSIMA_API_URL` overrides `api.base_url`

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use serenissima_store::StoreHttpConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A required credential is missing after file and environment are
    /// both considered.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Record Store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreSection {
    /// Root of the hosted store's REST surface.
    #[serde(default = "default_store_url")]
    pub base_url: String,
    /// The base (database) identifier.
    #[serde(default)]
    pub base_id: String,
    /// Bearer API key.
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_store_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            base_url: default_store_url(),
            base_id: String::new(),
            api_key: String::new(),
            timeout_secs: default_store_timeout_secs(),
        }
    }
}

/// Simulation API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiSection {
    /// Root of the simulation's REST surface.
    #[serde(default = "default_api_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSection {
    /// Tracing filter directive (e.g. `"info,serenissima_engine=debug"`).
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Top-level tooling configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolingConfig {
    /// Record Store connection settings.
    #[serde(default)]
    pub store: StoreSection,
    /// Simulation API connection settings.
    #[serde(default)]
    pub api: ApiSection,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ToolingConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Build configuration from defaults plus environment overrides, for
    /// invocations without a config file.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Produce the HTTP store configuration, checking credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if the API key or base
    /// id is still blank. Dry runs never call this -- they use the memory
    /// backend.
    pub fn store_http(&self) -> Result<StoreHttpConfig, ConfigError> {
        if self.store.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("store.api_key"));
        }
        if self.store.base_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential("store.base_id"));
        }
        Ok(
            StoreHttpConfig::new(&self.store.base_url, &self.store.base_id, &self.store.api_key)
                .with_timeout(Duration::from_secs(self.store.timeout_secs)),
        )
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("SERENISSIMA_STORE_API_KEY") {
            self.store.api_key = value;
        }
        if let Ok(value) = std::env::var("SERENISSIMA_STORE_BASE_ID") {
            self.store.base_id = value;
        }
        if let Ok(value) = std::env::var("SERENISSIMA_STORE_URL") {
            self.store.base_url = value;
        }
        if let Ok(value) = std::env::var("SERENISSIMA_API_URL") {
            self.api.base_url = value;
        }
    }
}

fn default_store_url() -> String {
    "https://records.serenissima.example/v0".to_owned()
}

const fn default_store_timeout_secs() -> u64 {
    30
}

fn default_api_url() -> String {
    "https://api.serenissima.example".to_owned()
}

const fn default_api_timeout_secs() -> u64 {
    60
}

fn default_log_filter() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn yaml_sections_all_default() {
        let config: ToolingConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config.store.timeout_secs, 30);
        assert_eq!(config.api.timeout_secs, 60);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let config: ToolingConfig = serde_yml::from_str(
            "store:\n  base_id: baseX\n  api_key: keyY\napi:\n  timeout_secs: 5\n",
        )
        .unwrap();
        assert_eq!(config.store.base_id, "baseX");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.store.timeout_secs, 30);
    }

    #[test]
    fn blank_credentials_fail_loudly() {
        let config = ToolingConfig::default();
        assert!(matches!(
            config.store_http(),
            Err(ConfigError::MissingCredential("store.api_key"))
        ));
    }
}
