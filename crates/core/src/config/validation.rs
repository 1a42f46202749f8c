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
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `llm_max_attempts` is outside 1..=10
    /// - `llm_timeout_ms` is less than 100ms or exceeds 10 minutes
    /// - `llm_max_concurrency` is outside 1..=64
    /// - `llm_temperature` is outside 0.0..=2.0
    /// - `llm_model` is empty
    /// - `llm_base_url` is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.llm_max_attempts) {
            return Err(ConfigError::Invalid {
                field: "llm_max_attempts".into(),
                reason: "must be between 1 and 10".into(),
            });
        }

        if self.llm_timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "llm_timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.llm_timeout_ms > 600_000 {
            return Err(ConfigError::Invalid {
                field: "llm_timeout_ms".into(),
                reason: "must not exceed 10 minutes (600000ms)".into(),
            });
        }

        if !(1..=64).contains(&self.llm_max_concurrency) {
            return Err(ConfigError::Invalid {
                field: "llm_max_concurrency".into(),
                reason: "must be between 1 and 64".into(),
            });
        }

        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(ConfigError::Invalid {
                field: "llm_temperature".into(),
                reason: "must be between 0.0 and 2.0".into(),
            });
        }

        if self.llm_model.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "llm_model".into(), reason: "must not be empty".into() });
        }

        match url::Url::parse(&self.llm_base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            Ok(u) => {
                return Err(ConfigError::Invalid {
                    field: "llm_base_url".into(),
                    reason: format!("unsupported scheme: {}", u.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::Invalid { field: "llm_base_url".into(), reason: e.to_string() });
            }
        }

        if self.llm_api_key.is_none() && self.llm_base_url.starts_with("https://") {
            tracing::debug!(base_url = %self.llm_base_url, "no llm_api_key set for remote chat endpoint");
        }

        Ok(())
    }
}
