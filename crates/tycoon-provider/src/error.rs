//! Error types for the content provider.
//!
//! None of these reach the player directly. [`crate::fetch_batch`] turns
//! them into an empty batch and [`crate::verify_answer`] into a local
//! comparison; they exist so the failure can be logged with a cause.

/// Errors that can occur while generating or judging tasks.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// Failed to load or render a prompt template.
    #[error("template error: {0}")]
    Template(String),

    /// The LLM reply could not be turned into tasks.
    #[error("response parse error: {0}")]
    Parse(String),

    /// The LLM call did not complete within the configured deadline.
    #[error("LLM call exceeded {timeout_ms} ms")]
    Timeout {
        /// The deadline that was exceeded.
        timeout_ms: u128,
    },

    /// Provider configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// An API response body was not valid JSON.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
