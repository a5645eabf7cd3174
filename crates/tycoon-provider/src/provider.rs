//! The task content provider contract and its LLM implementation.
//!
//! [`TaskContentProvider`] is the seam the session layer depends on. Its
//! methods may fail; the free functions [`fetch_batch`] and
//! [`verify_answer`] wrap any provider and never do:
//!
//! - generation failure becomes an empty batch
//! - verification of a task with no expected answer is an automatic pass
//!   and makes no provider call
//! - verification failure falls back to a local case-insensitive exact
//!   comparison

use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use tycoon_types::Task;

use crate::config::ProviderSettings;
use crate::error::ProviderError;
use crate::llm::{LlmBackend, create_backend};
use crate::parse::{parse_task_batch, parse_verdict};
use crate::prompt::{PromptEngine, RenderedPrompt};

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Source of task batches and answer verdicts.
///
/// Futures are `Send` so the session can drive them from any runtime
/// worker, including axum handlers.
pub trait TaskContentProvider: Send + Sync {
    /// Generate up to `count` tasks appropriate for `level`.
    ///
    /// Provider-assigned ids must not be trusted; implementations return
    /// tasks carrying fresh local ids.
    fn generate_tasks(
        &self,
        level: u32,
        count: u32,
    ) -> impl Future<Output = Result<Vec<Task>, ProviderError>> + Send;

    /// Judge `answer` against the task's expected answer.
    ///
    /// Only called for tasks that have a non-empty expected answer.
    fn judge_answer(
        &self,
        task: &Task,
        answer: &str,
    ) -> impl Future<Output = Result<bool, ProviderError>> + Send;
}

// ---------------------------------------------------------------------------
// Fail-safe wrappers
// ---------------------------------------------------------------------------

/// Where a batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSource {
    /// The provider answered (the batch may still be empty or partial).
    Provider,
    /// The provider failed; the batch is empty.
    Unavailable,
}

/// A freshly fetched set of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBatch {
    /// The tasks, in provider order.
    pub tasks: Vec<Task>,
    /// Whether the provider was reachable.
    pub source: BatchSource,
}

/// How a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// The task has no expected answer; any answer passes.
    AutoAccepted,
    /// The provider judged the answer.
    Provider,
    /// The provider failed; the answer was compared locally.
    LocalFallback,
}

/// The outcome of verifying an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the answer is accepted.
    pub correct: bool,
    /// How the decision was made.
    pub source: VerdictSource,
}

/// Fetch a batch, turning any provider failure into an empty batch.
pub async fn fetch_batch<P: TaskContentProvider>(
    provider: &P,
    level: u32,
    count: u32,
) -> TaskBatch {
    match provider.generate_tasks(level, count).await {
        Ok(tasks) => {
            info!(
                level,
                requested = count,
                received = tasks.len(),
                "task batch generated"
            );
            TaskBatch {
                tasks,
                source: BatchSource::Provider,
            }
        }
        Err(e) => {
            warn!(level, error = %e, "task generation failed, presenting empty batch");
            TaskBatch {
                tasks: Vec::new(),
                source: BatchSource::Unavailable,
            }
        }
    }
}

/// Verify an answer, never failing.
pub async fn verify_answer<P: TaskContentProvider>(
    provider: &P,
    task: &Task,
    answer: &str,
) -> Verdict {
    let Some(expected) = task.expected_answer() else {
        return Verdict {
            correct: true,
            source: VerdictSource::AutoAccepted,
        };
    };

    match provider.judge_answer(task, answer).await {
        Ok(correct) => {
            debug!(task_id = %task.id, correct, "answer judged by provider");
            Verdict {
                correct,
                source: VerdictSource::Provider,
            }
        }
        Err(e) => {
            let correct = local_match(expected, answer);
            warn!(
                task_id = %task.id,
                error = %e,
                correct,
                "verification unavailable, compared answer locally"
            );
            Verdict {
                correct,
                source: VerdictSource::LocalFallback,
            }
        }
    }
}

/// Case-insensitive exact comparison. Whitespace is significant.
pub fn local_match(expected: &str, answer: &str) -> bool {
    expected.to_lowercase() == answer.to_lowercase()
}

// ---------------------------------------------------------------------------
// LLM implementation
// ---------------------------------------------------------------------------

/// Production provider: prompts an LLM over HTTP.
pub struct LlmContentProvider {
    backend: LlmBackend,
    prompts: PromptEngine,
    request_timeout: Duration,
    max_retries: u32,
    task_language: String,
}

impl LlmContentProvider {
    /// Build the provider from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Template`] if the prompt templates cannot
    /// be loaded.
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let prompts = match &settings.templates_dir {
            Some(dir) => PromptEngine::from_dir(dir)?,
            None => PromptEngine::builtin()?,
        };
        let backend = create_backend(&settings.backend);
        info!(
            backend = backend.name(),
            model = %settings.backend.model,
            timeout_ms = settings.request_timeout.as_millis(),
            max_retries = settings.max_retries,
            "content provider ready"
        );
        Ok(Self {
            backend,
            prompts,
            request_timeout: settings.request_timeout,
            max_retries: settings.max_retries,
            task_language: settings.task_language.clone(),
        })
    }

    /// Call the backend with a deadline, retrying up to `max_retries` times.
    async fn call(&self, prompt: &RenderedPrompt) -> Result<String, ProviderError> {
        let mut attempt: u32 = 0;
        loop {
            let result = timeout(self.request_timeout, self.backend.complete(prompt))
                .await
                .unwrap_or_else(|_| {
                    Err(ProviderError::Timeout {
                        timeout_ms: self.request_timeout.as_millis(),
                    })
                });

            match result {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.max_retries => {
                    attempt = attempt.saturating_add(1);
                    warn!(
                        backend = self.backend.name(),
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "LLM call failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl TaskContentProvider for LlmContentProvider {
    async fn generate_tasks(&self, level: u32, count: u32) -> Result<Vec<Task>, ProviderError> {
        let prompt = self
            .prompts
            .render_generation(level, count, &self.task_language)?;
        let reply = self.call(&prompt).await?;
        parse_task_batch(&reply)
    }

    async fn judge_answer(&self, task: &Task, answer: &str) -> Result<bool, ProviderError> {
        let expected = task.expected_answer().unwrap_or_default();
        let prompt = self
            .prompts
            .render_verification(&task.description, expected, answer)?;
        let reply = self.call(&prompt).await?;
        Ok(parse_verdict(&reply))
    }
}
