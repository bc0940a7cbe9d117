//! Configuration loading
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The model provider's API key and base URL have no default. Startup fails
//! with [`Error::Config`] when either is missing so the server never accepts
//! traffic it cannot serve.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const ENV_API_KEY: &str = "FLASHAI_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "OPENAI_API_KEY";
pub const ENV_API_BASE_URL: &str = "FLASHAI_API_BASE_URL";
pub const ENV_API_BASE_URL_FALLBACK: &str = "API_BASE_URL";
pub const ENV_MODEL: &str = "FLASHAI_MODEL";
pub const ENV_DATA_FILE: &str = "FLASHAI_DATA_FILE";
pub const ENV_BIND: &str = "FLASHAI_BIND";

pub const DEFAULT_MODEL: &str = "gpt-4.1-nano-2025-04-14";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 8000;

/// Settings read from the TOML file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
    pub retry_max_delay_ms: Option<u64>,
    pub data_file: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub model: Option<String>,
    pub data_file: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    pub data_file: PathBuf,
    pub bind_address: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("max_attempts", &self.max_attempts)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("retry_max_delay", &self.retry_max_delay)
            .field("data_file", &self.data_file)
            .field("bind_address", &self.bind_address)
            .field("cors_origins", &self.cors_origins)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl AppConfig {
    /// Resolve configuration from CLI overrides, environment and TOML
    pub fn resolve(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let api_key = first_valid([
            overrides.api_key.clone(),
            env_value(ENV_API_KEY),
            env_value(ENV_API_KEY_FALLBACK),
            toml_config.api_key.clone(),
        ])
        .ok_or_else(|| {
            Error::Config(format!(
                "Model provider API key is not configured. Set --api-key, {} ({}) or api_key in config.toml",
                ENV_API_KEY, ENV_API_KEY_FALLBACK
            ))
        })?;

        let api_base_url = first_valid([
            overrides.api_base_url.clone(),
            env_value(ENV_API_BASE_URL),
            env_value(ENV_API_BASE_URL_FALLBACK),
            toml_config.api_base_url.clone(),
        ])
        .ok_or_else(|| {
            Error::Config(format!(
                "Model provider base URL is not configured. Set --api-base-url, {} ({}) or api_base_url in config.toml",
                ENV_API_BASE_URL, ENV_API_BASE_URL_FALLBACK
            ))
        })?;

        let model = first_valid([
            overrides.model.clone(),
            env_value(ENV_MODEL),
            toml_config.model.clone(),
        ])
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let data_file = overrides
            .data_file
            .clone()
            .or_else(|| env_value(ENV_DATA_FILE).map(PathBuf::from))
            .or_else(|| toml_config.data_file.clone())
            .unwrap_or_else(default_data_file);

        let bind_address = first_valid([
            overrides.bind_address.clone(),
            env_value(ENV_BIND),
            toml_config.bind_address.clone(),
        ])
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let log_level = overrides
            .log_level
            .clone()
            .unwrap_or_else(|| toml_config.logging.level.clone());

        let config = Self {
            api_key: api_key.trim().to_string(),
            api_base_url: api_base_url.trim().trim_end_matches('/').to_string(),
            model,
            temperature: toml_config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: toml_config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            request_timeout: Duration::from_secs(
                toml_config.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            max_attempts: toml_config.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            retry_base_delay: Duration::from_millis(
                toml_config
                    .retry_base_delay_ms
                    .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
            ),
            retry_max_delay: Duration::from_millis(
                toml_config
                    .retry_max_delay_ms
                    .unwrap_or(DEFAULT_RETRY_MAX_DELAY_MS),
            ),
            data_file,
            bind_address,
            cors_origins: toml_config
                .cors_origins
                .clone()
                .unwrap_or_else(default_cors_origins),
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if !is_valid_key(&self.api_key) {
            return Err(Error::Config("API key cannot be empty".to_string()));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "API base URL must start with http:// or https:// (got '{}')",
                self.api_base_url
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config("request_timeout_secs must be positive".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Config(format!(
                "temperature must be within 0.0..=2.0 (got {})",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Load the TOML config file
///
/// An explicitly requested file must exist. The default location is optional:
/// a missing file logs a warning and yields defaults.
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            Some(path) => {
                warn!(
                    "No config file at {}, using environment and defaults",
                    path.display()
                );
                return Ok(TomlConfig::default());
            }
            None => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Default config file location (`~/.config/flashai/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flashai").join("config.toml"))
}

/// Default flashcard file location
pub fn default_data_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("flashai"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .join("flashcards.csv")
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

/// Validate a secret or URL value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn first_valid<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| is_valid_key(value))
}
