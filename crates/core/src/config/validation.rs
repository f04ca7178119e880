//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `classify_timeout_ms` is less than 100ms or exceeds 1 minute
    /// - `generate_timeout_ms` is less than 1s or exceeds 5 minutes
    /// - `bind_addr` or a model name is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classify_timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "classify_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.classify_timeout_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "classify_timeout_ms".into(),
                reason: "must not exceed 1 minute (60000ms)".into(),
            });
        }

        if self.generate_timeout_ms < 1_000 {
            return Err(ConfigError::Invalid {
                field: "generate_timeout_ms".into(),
                reason: "must be at least 1s (1000ms)".into(),
            });
        }
        if self.generate_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "generate_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.bind_addr.is_empty() {
            return Err(ConfigError::Invalid { field: "bind_addr".into(), reason: "must not be empty".into() });
        }

        if self.classifier_model.is_empty() {
            return Err(ConfigError::Invalid { field: "classifier_model".into(), reason: "must not be empty".into() });
        }
        if self.generator_model.is_empty() {
            return Err(ConfigError::Invalid { field: "generator_model".into(), reason: "must not be empty".into() });
        }

        Ok(())
    }
}
