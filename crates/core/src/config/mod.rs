//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (DIRASA_*)
//! 2. TOML config file (if DIRASA_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (DIRASA_*)
/// 2. TOML config file (if DIRASA_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the classification provider.
    ///
    /// Set via DIRASA_CLASSIFIER_API_KEY environment variable.
    /// Required at server startup; runtime classifier failures degrade to
    /// the raw-input fallback instead.
    #[serde(default)]
    pub classifier_api_key: Option<String>,

    /// API key for the generation provider.
    ///
    /// Set via DIRASA_GENERATOR_API_KEY environment variable.
    /// Required before any study can be generated.
    #[serde(default)]
    pub generator_api_key: Option<String>,

    /// Model used for name classification.
    ///
    /// Set via DIRASA_CLASSIFIER_MODEL environment variable.
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,

    /// Model used for long-form study generation.
    ///
    /// Set via DIRASA_GENERATOR_MODEL environment variable.
    #[serde(default = "default_generator_model")]
    pub generator_model: String,

    /// Path to the SQLite archive database.
    ///
    /// Set via DIRASA_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Address the HTTP server binds to.
    ///
    /// Set via DIRASA_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Classification request timeout in milliseconds.
    ///
    /// Set via DIRASA_CLASSIFY_TIMEOUT_MS environment variable.
    #[serde(default = "default_classify_timeout_ms")]
    pub classify_timeout_ms: u64,

    /// Generation request timeout in milliseconds.
    ///
    /// Long-form generation is slow; this bound is generous but keeps a
    /// hung provider from pinning the request forever.
    /// Set via DIRASA_GENERATE_TIMEOUT_MS environment variable.
    #[serde(default = "default_generate_timeout_ms")]
    pub generate_timeout_ms: u64,
}

fn default_classifier_model() -> String {
    "gpt-4o-mini".into()
}

fn default_generator_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./market_archive.db")
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".into()
}

fn default_classify_timeout_ms() -> u64 {
    15_000
}

fn default_generate_timeout_ms() -> u64 {
    120_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            classifier_api_key: None,
            generator_api_key: None,
            classifier_model: default_classifier_model(),
            generator_model: default_generator_model(),
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            classify_timeout_ms: default_classify_timeout_ms(),
            generate_timeout_ms: default_generate_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Classification timeout as Duration for use with reqwest/tokio.
    pub fn classify_timeout(&self) -> Duration {
        Duration::from_millis(self.classify_timeout_ms)
    }

    /// Generation timeout as Duration for use with reqwest/tokio.
    pub fn generate_timeout(&self) -> Duration {
        Duration::from_millis(self.generate_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `DIRASA_`
    /// 2. TOML file from `DIRASA_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("DIRASA_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("DIRASA_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the classifier API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the classifier key is not set.
    pub fn require_classifier_api_key(&self) -> Result<&str, ConfigError> {
        self.classifier_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "classifier_api_key".into(),
            hint: "Set DIRASA_CLASSIFIER_API_KEY environment variable".into(),
        })
    }

    /// Check if the generator API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the generator key is not set.
    pub fn require_generator_api_key(&self) -> Result<&str, ConfigError> {
        self.generator_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "generator_api_key".into(),
            hint: "Set DIRASA_GENERATOR_API_KEY environment variable".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./market_archive.db"));
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.classifier_model, "gpt-4o-mini");
        assert_eq!(config.generator_model, "gemini-2.5-flash");
        assert_eq!(config.classify_timeout_ms, 15_000);
        assert_eq!(config.generate_timeout_ms, 120_000);
        assert!(config.classifier_api_key.is_none());
        assert!(config.generator_api_key.is_none());
    }

    #[test]
    fn test_timeout_durations() {
        let config = AppConfig::default();
        assert_eq!(config.classify_timeout(), Duration::from_millis(15_000));
        assert_eq!(config.generate_timeout(), Duration::from_millis(120_000));
    }

    #[test]
    fn test_require_classifier_api_key_missing() {
        let config = AppConfig::default();
        let result = config.require_classifier_api_key();
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_generator_api_key_present() {
        let config = AppConfig { generator_api_key: Some("test-key".into()), ..Default::default() };
        let result = config.require_generator_api_key();
        assert_eq!(result.unwrap(), "test-key");
    }
}
