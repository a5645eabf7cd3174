//! Task content provider for the Tycoon earning game.
//!
//! Generates daily task batches and judges answers by prompting an LLM.
//! The session layer depends only on the [`TaskContentProvider`] trait and
//! on the fail-safe wrappers [`fetch_batch`] and [`verify_answer`], which
//! degrade to an empty batch and a local answer comparison respectively.
//!
//! # Modules
//!
//! - [`config`] -- Backend selection and provider settings
//! - [`llm`] -- Gemini, OpenAI-compatible and Anthropic HTTP backends
//! - [`prompt`] -- `minijinja` prompt templates
//! - [`parse`] -- Reply parsing and task schema validation
//! - [`provider`] -- The provider trait, wrappers and LLM implementation
//! - [`error`] -- Provider error type

pub mod config;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod provider;

pub use config::{
    BackendType, DEFAULT_TASK_BATCH_SIZE, DEFAULT_TASK_LANGUAGE, LlmBackendConfig,
    ProviderSettings,
};
pub use error::ProviderError;
pub use provider::{
    BatchSource, LlmContentProvider, TaskBatch, TaskContentProvider, Verdict, VerdictSource,
    fetch_batch, local_match, verify_answer,
};
