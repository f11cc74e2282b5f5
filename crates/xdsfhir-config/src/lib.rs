//! # xdsfhir-config
//!
//! Application configuration: an optional TOML file overlaid by
//! `XDSFHIR__*` environment variables, e.g.
//! `XDSFHIR__QUERY__MAX_RESULTS=50` or `XDSFHIR__BACKEND__BASE_URL=...`.
//!
//! ```toml
//! [query]
//! max_results = 1000
//!
//! [backend]
//! base_url = "http://localhost:8080/fhir"
//! timeout_ms = 30000
//!
//! [repository.endpoints]
//! "1.2.3.4" = "http://repo.example.org/docs/$documentUniqueId"
//!
//! [logging]
//! level = "info"
//! ```

pub mod loader;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use xdsfhir_mapping::{DOCUMENT_UNIQUE_ID_PLACEHOLDER, RepositorySettings};
use xdsfhir_query::QuerySettings;

pub use loader::{DEFAULT_CONFIG_FILE, ENV_PREFIX, load_config};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.max_results == 0 {
            return Err(invalid("query.max_results must be > 0"));
        }

        if self.backend.base_url.trim().is_empty() {
            return Err(invalid("backend.base_url must not be empty"));
        }
        if let Err(e) = url::Url::parse(&self.backend.base_url) {
            return Err(invalid(format!(
                "backend.base_url '{}' is not a valid URL: {e}",
                self.backend.base_url
            )));
        }
        if self.backend.timeout_ms == 0 {
            return Err(invalid("backend.timeout_ms must be > 0"));
        }

        for (repository, template) in &self.repository.endpoints {
            if !template.contains(DOCUMENT_UNIQUE_ID_PLACEHOLDER) {
                return Err(invalid(format!(
                    "repository.endpoints.{repository} must contain {DOCUMENT_UNIQUE_ID_PLACEHOLDER}"
                )));
            }
        }

        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(invalid(format!("logging.level must be one of {valid_levels:?}")));
        }
        Ok(())
    }

    /// Effective configuration rendered as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

/// FHIR server the registry metadata is read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/fhir".into()
}
fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
