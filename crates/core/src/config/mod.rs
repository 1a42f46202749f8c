//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAGEDATE_*)
//! 2. TOML config file (if PAGEDATE_CONFIG_FILE set)
//! 3. Built-in defaults

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
/// 1. Environment variables (PAGEDATE_*)
/// 2. TOML config file (if PAGEDATE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Whether the heuristic inference fallback runs after the selector strategies.
    ///
    /// Set via PAGEDATE_USE_INFERENCE environment variable.
    #[serde(default = "default_true")]
    pub use_inference: bool,

    /// Base URL of the chat completions service (`/chat/completions` is appended).
    ///
    /// Set via PAGEDATE_LLM_BASE_URL environment variable.
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,

    /// Generative model name sent with each request.
    ///
    /// Set via PAGEDATE_LLM_MODEL environment variable.
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Optional bearer token for the chat endpoint.
    ///
    /// Set via PAGEDATE_LLM_API_KEY environment variable.
    #[serde(default)]
    pub llm_api_key: Option<String>,

    /// Set via PAGEDATE_LLM_MAX_TOKENS environment variable.
    #[serde(default = "default_llm_max_tokens")]
    pub llm_max_tokens: u32,

    /// Set via PAGEDATE_LLM_TEMPERATURE environment variable.
    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f32,

    /// Attempts per document before giving up.
    ///
    /// Set via PAGEDATE_LLM_MAX_ATTEMPTS environment variable.
    #[serde(default = "default_llm_max_attempts")]
    pub llm_max_attempts: u32,

    /// Per-request timeout in milliseconds. A timeout counts as a failed attempt.
    ///
    /// Set via PAGEDATE_LLM_TIMEOUT_MS environment variable.
    #[serde(default = "default_llm_timeout_ms")]
    pub llm_timeout_ms: u64,

    /// Ceiling on simultaneous chat requests across all documents.
    ///
    /// Set via PAGEDATE_LLM_MAX_CONCURRENCY environment variable.
    #[serde(default = "default_llm_max_concurrency")]
    pub llm_max_concurrency: usize,
}

fn default_true() -> bool {
    true
}

fn default_llm_base_url() -> String {
    "http://localhost:8000/v1".into()
}

fn default_llm_model() -> String {
    "Qwen/Qwen3-32B".into()
}

fn default_llm_max_tokens() -> u32 {
    500
}

fn default_llm_temperature() -> f32 {
    0.7
}

fn default_llm_max_attempts() -> u32 {
    3
}

fn default_llm_timeout_ms() -> u64 {
    60_000
}

fn default_llm_max_concurrency() -> usize {
    16
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_inference: true,
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
            llm_api_key: None,
            llm_max_tokens: default_llm_max_tokens(),
            llm_temperature: default_llm_temperature(),
            llm_max_attempts: default_llm_max_attempts(),
            llm_timeout_ms: default_llm_timeout_ms(),
            llm_max_concurrency: default_llm_max_concurrency(),
        }
    }
}

/// Settings for the LLM extractor, projected from [`AppConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_attempts: u32,
    pub timeout: Duration,
    pub max_concurrency: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        AppConfig::default().llm()
    }
}

impl LlmConfig {
    /// Full URL of the chat completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl AppConfig {
    /// LLM timeout as Duration for use with reqwest.
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm_timeout_ms)
    }

    pub fn llm(&self) -> LlmConfig {
        LlmConfig {
            base_url: self.llm_base_url.clone(),
            model: self.llm_model.clone(),
            api_key: self.llm_api_key.clone(),
            max_tokens: self.llm_max_tokens,
            temperature: self.llm_temperature,
            max_attempts: self.llm_max_attempts,
            timeout: self.llm_timeout(),
            max_concurrency: self.llm_max_concurrency,
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PAGEDATE_`
    /// 2. TOML file from `PAGEDATE_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("PAGEDATE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PAGEDATE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
