//! Error types for the `tycoon` binary.

/// Top-level error for the binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tycoon_core::ConfigError,
    },

    /// The content provider could not be built.
    #[error("provider error: {source}")]
    Provider {
        /// The underlying provider error.
        #[from]
        source: tycoon_provider::ProviderError,
    },

    /// The API server failed to start or crashed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: tycoon_server::ServerError,
    },
}
