//! Configuration types for the content provider.
//!
//! These are the resolved, typed settings. The YAML file and environment
//! overrides are handled by `tycoon-core`, which builds a
//! [`ProviderSettings`] once at startup.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ProviderError;

/// Default number of tasks requested per batch.
pub const DEFAULT_TASK_BATCH_SIZE: u32 = 3;

/// Default language for generated task text.
pub const DEFAULT_TASK_LANGUAGE: &str = "Bengali";

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Google Gemini `generateContent` API.
    Gemini,
    /// `OpenAI`-compatible API (works with `OpenAI`, `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API (different request format).
    Anthropic,
}

impl BackendType {
    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl FromStr for BackendType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(ProviderError::Config(format!(
                "unknown backend type: {other}"
            ))),
        }
    }
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone)]
pub struct LlmBackendConfig {
    /// The backend type.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://generativelanguage.googleapis.com/v1beta`).
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier (e.g. `gemini-3-flash-preview`).
    pub model: String,
}

/// Everything the LLM content provider needs.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Backend endpoint and credentials.
    pub backend: LlmBackendConfig,
    /// Deadline for a single LLM call.
    pub request_timeout: Duration,
    /// Extra attempts after a failed call (0 = fire once).
    pub max_retries: u32,
    /// Directory with prompt templates, or `None` for the built-in set.
    pub templates_dir: Option<PathBuf>,
    /// Language the generated titles and descriptions are written in.
    pub task_language: String,
}
