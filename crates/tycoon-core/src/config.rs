//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `tycoon-config.yaml` at the project
//! root. Every field has a default, so a missing file or an empty document
//! yields a working configuration; only the LLM API key normally needs to
//! be supplied, usually through the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tycoon_provider::{
    BackendType, DEFAULT_TASK_BATCH_SIZE, DEFAULT_TASK_LANGUAGE, LlmBackendConfig,
    ProviderSettings,
};

use crate::controller::SessionSettings;

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

    /// A value is out of range or unrecognized.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `tycoon-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TycoonConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Session timing.
    #[serde(default)]
    pub session: SessionConfig,

    /// Content provider (LLM) settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TycoonConfig {
    /// Load configuration from a YAML file, apply environment overrides and
    /// validate.
    ///
    /// A missing file is not an error: defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML file without overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string without overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override values with environment variables when set.
    ///
    /// - `LLM_API_KEY` (or `API_KEY`) overrides `llm.api_key`
    /// - `LLM_BACKEND` overrides `llm.backend`
    /// - `LLM_API_URL` overrides `llm.api_url`
    /// - `LLM_MODEL` overrides `llm.model`
    /// - `TYCOON_HOST` overrides `server.host`
    /// - `TYCOON_PORT` overrides `server.port` (ignored if not a port number)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LLM_API_KEY").or_else(|_| std::env::var("API_KEY")) {
            self.llm.api_key = val;
        }
        if let Ok(val) = std::env::var("LLM_BACKEND") {
            self.llm.backend = val;
        }
        if let Ok(val) = std::env::var("LLM_API_URL") {
            self.llm.api_url = val;
        }
        if let Ok(val) = std::env::var("LLM_MODEL") {
            self.llm.model = val;
        }
        if let Ok(val) = std::env::var("TYCOON_HOST") {
            self.server.host = val;
        }
        if let Some(port) = std::env::var("TYCOON_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
        {
            self.server.port = port;
        }
    }

    /// Reject values the application cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.energy_regen_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "session.energy_regen_interval_ms must be greater than zero".to_owned(),
            ));
        }
        if self.session.notification_ttl_ms == 0 {
            return Err(ConfigError::Invalid(
                "session.notification_ttl_ms must be greater than zero".to_owned(),
            ));
        }
        if self.llm.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "llm.request_timeout_ms must be greater than zero".to_owned(),
            ));
        }
        if self.llm.task_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "llm.task_batch_size must be greater than zero".to_owned(),
            ));
        }
        if self.llm.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.api_url must not be empty".to_owned()));
        }
        self.llm
            .backend
            .parse::<BackendType>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    /// Resolve the content provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the backend name is unknown.
    pub fn provider_settings(&self) -> Result<ProviderSettings, ConfigError> {
        let backend_type = self
            .llm
            .backend
            .parse::<BackendType>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(ProviderSettings {
            backend: LlmBackendConfig {
                backend_type,
                api_url: self.llm.api_url.clone(),
                api_key: self.llm.api_key.clone(),
                model: self.llm.model.clone(),
            },
            request_timeout: Duration::from_millis(self.llm.request_timeout_ms),
            max_retries: self.llm.max_retries,
            templates_dir: self.llm.templates_dir.clone(),
            task_language: self.llm.task_language.clone(),
        })
    }

    /// Resolve the session controller settings.
    pub const fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            task_batch_size: self.llm.task_batch_size,
            notification_ttl: Duration::from_millis(self.session.notification_ttl_ms),
        }
    }

    /// Interval between energy regeneration ticks.
    pub const fn energy_regen_interval(&self) -> Duration {
        Duration::from_millis(self.session.energy_regen_interval_ms)
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Session timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Milliseconds between energy regeneration ticks.
    #[serde(default = "default_energy_regen_interval_ms")]
    pub energy_regen_interval_ms: u64,

    /// How long a notification stays visible, in milliseconds.
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            energy_regen_interval_ms: default_energy_regen_interval_ms(),
            notification_ttl_ms: default_notification_ttl_ms(),
        }
    }
}

/// LLM content provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LlmConfig {
    /// Backend name: `gemini`, `openai` (also `deepseek`, `ollama`) or
    /// `anthropic`.
    #[serde(default = "default_llm_backend")]
    pub backend: String,

    /// Base API URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key (normally supplied via `LLM_API_KEY`).
    #[serde(default)]
    pub api_key: String,

    /// Deadline for a single LLM call in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Extra attempts after a failed call (0 = fire once).
    #[serde(default)]
    pub max_retries: u32,

    /// Tasks requested per batch.
    #[serde(default = "default_task_batch_size")]
    pub task_batch_size: u32,

    /// Language for generated task text.
    #[serde(default = "default_task_language")]
    pub task_language: String,

    /// Prompt template directory (`None` = built-in templates).
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_llm_backend(),
            api_url: default_api_url(),
            model: default_model(),
            api_key: String::new(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: 0,
            task_batch_size: default_task_batch_size(),
            task_language: default_task_language(),
            templates_dir: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
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

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_energy_regen_interval_ms() -> u64 {
    15_000
}

const fn default_notification_ttl_ms() -> u64 {
    3_000
}

fn default_llm_backend() -> String {
    "gemini".to_owned()
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_owned()
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_owned()
}

const fn default_request_timeout_ms() -> u64 {
    15_000
}

const fn default_task_batch_size() -> u32 {
    DEFAULT_TASK_BATCH_SIZE
}

fn default_task_language() -> String {
    DEFAULT_TASK_LANGUAGE.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}
