//! LLM backend abstraction and implementations.
//!
//! Enum dispatch over three HTTP APIs: Google Gemini `generateContent`,
//! `OpenAI`-compatible chat completions and the Anthropic Messages API.
//! Every backend takes a [`RenderedPrompt`] and returns the reply text;
//! interpreting that text is the caller's job.

use serde_json::{Value, json};

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::ProviderError;
use crate::prompt::{RenderedPrompt, ResponseFormat};

/// Upper bound on reply length. Three tasks in a non-Latin script need
/// more room than a one-word verdict, so this is sized for generation.
const MAX_OUTPUT_TOKENS: u32 = 2048;

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// An LLM backend that can process a prompt and return a response.
///
/// Enum dispatch keeps the provider future `Send` without boxing.
pub enum LlmBackend {
    /// Google Gemini API.
    Gemini(GeminiBackend),
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Send a prompt to the LLM and return the response text.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::LlmBackend`] if the HTTP call fails or the
    /// reply text cannot be located, and [`ProviderError::Serde`] if the
    /// response body is not JSON.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, ProviderError> {
        match self {
            Self::Gemini(backend) => backend.complete(prompt).await,
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Anthropic(backend) => backend.complete(prompt).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Gemini(_) => "gemini",
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }
}

// ---------------------------------------------------------------------------
// Gemini backend
// ---------------------------------------------------------------------------

/// Backend for the Google Gemini `generateContent` API.
///
/// Sends requests to `{api_url}/models/{model}:generateContent` with the
/// key in the `x-goog-api-key` header. JSON prompts switch on
/// `responseMimeType: application/json`.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);

        let request = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request_body(prompt));

        let json = send_json(request, "Gemini").await?;
        extract_gemini_content(&json)
    }
}

/// Build the `generateContent` request body.
fn gemini_request_body(prompt: &RenderedPrompt) -> Value {
    let mut generation_config = json!({ "maxOutputTokens": MAX_OUTPUT_TOKENS });
    if prompt.format == ResponseFormat::Json
        && let Some(obj) = generation_config.as_object_mut()
    {
        obj.insert("responseMimeType".to_owned(), json!("application/json"));
    }

    json!({
        "systemInstruction": { "parts": [{ "text": prompt.system }] },
        "contents": [
            { "role": "user", "parts": [{ "text": prompt.user }] }
        ],
        "generationConfig": generation_config
    })
}

/// Extract the text from a Gemini response.
///
/// Concatenates every text part of the first candidate; Gemini can split a
/// long reply across several parts.
fn extract_gemini_content(json: &Value) -> Result<String, ProviderError> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ProviderError::LlmBackend(
                "Gemini response missing candidates[0].content.parts".to_owned(),
            )
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        return Err(ProviderError::LlmBackend(
            "Gemini response contained no text parts".to_owned(),
        ));
    }
    Ok(text)
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Works with `OpenAI`, `DeepSeek`, and Ollama endpoints.
/// Sends requests to `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.api_url);

        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": 0.7,
            "max_tokens": MAX_OUTPUT_TOKENS
        });
        if prompt.format == ResponseFormat::Json
            && let Some(obj) = body.as_object_mut()
        {
            obj.insert("response_format".to_owned(), json!({"type": "json_object"}));
        }

        let request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body);

        let json = send_json(request, "OpenAI").await?;
        extract_openai_content(&json)
    }
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &Value) -> Result<String, ProviderError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            ProviderError::LlmBackend(
                "OpenAI response missing choices[0].message.content".to_owned(),
            )
        })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// The system prompt is a top-level field and the key travels in
/// `x-api-key`. There is no JSON mode; the prompt asks for JSON instead.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, ProviderError> {
        let url = format!("{}/messages", self.api_url);

        let body = json!({
            "model": self.model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        });

        let request = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body);

        let json = send_json(request, "Anthropic").await?;
        extract_anthropic_content(&json)
    }
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &Value) -> Result<String, ProviderError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            ProviderError::LlmBackend("Anthropic response missing content[0].text".to_owned())
        })
}

// ---------------------------------------------------------------------------
// Shared HTTP plumbing
// ---------------------------------------------------------------------------

/// Send a request, reject non-2xx statuses and parse the body as JSON.
async fn send_json(request: reqwest::RequestBuilder, label: &str) -> Result<Value, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::LlmBackend(format!("{label} request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::LlmBackend(format!("{label} body read failed: {e}")))?;

    if !status.is_success() {
        return Err(ProviderError::LlmBackend(format!(
            "{label} returned {status}: {body}"
        )));
    }

    Ok(serde_json::from_str(&body)?)
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create an LLM backend from configuration.
pub fn create_backend(config: &LlmBackendConfig) -> LlmBackend {
    match config.backend_type {
        BackendType::Gemini => LlmBackend::Gemini(GeminiBackend::new(config)),
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(format: ResponseFormat) -> RenderedPrompt {
        RenderedPrompt {
            system: "sys".to_owned(),
            user: "usr".to_owned(),
            format,
        }
    }

    #[test]
    fn extract_gemini_content_joins_parts() {
        let json = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "{\"tasks\": "}, {"text": "[]}"}]
                }
            }]
        });
        let result = extract_gemini_content(&json);
        assert_eq!(result.ok().as_deref(), Some("{\"tasks\": []}"));
    }

    #[test]
    fn extract_gemini_content_blocked_prompt() {
        // Safety-blocked prompts come back without candidates.
        let json = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert!(extract_gemini_content(&json).is_err());

        let empty_parts = json!({"candidates": [{"content": {"parts": []}}]});
        assert!(extract_gemini_content(&empty_parts).is_err());
    }

    #[test]
    fn gemini_body_sets_json_mode_only_for_json_prompts() {
        let body = gemini_request_body(&prompt(ResponseFormat::Json));
        assert_eq!(
            body.pointer("/generationConfig/responseMimeType"),
            Some(&json!("application/json"))
        );
        assert_eq!(
            body.pointer("/systemInstruction/parts/0/text"),
            Some(&json!("sys"))
        );
        assert_eq!(body.pointer("/contents/0/parts/0/text"), Some(&json!("usr")));

        let text_body = gemini_request_body(&prompt(ResponseFormat::Text));
        assert!(text_body.pointer("/generationConfig/responseMimeType").is_none());
    }

    #[test]
    fn extract_openai_content_valid() {
        let json = json!({
            "choices": [{
                "message": {
                    "content": "true"
                }
            }]
        });
        let result = extract_openai_content(&json);
        assert_eq!(result.ok().as_deref(), Some("true"));
    }

    #[test]
    fn extract_openai_content_missing_choices() {
        let json = json!({"error": "rate_limit"});
        assert!(extract_openai_content(&json).is_err());
    }

    #[test]
    fn extract_anthropic_content_valid() {
        let json = json!({
            "content": [{
                "type": "text",
                "text": "False."
            }]
        });
        let result = extract_anthropic_content(&json);
        assert_eq!(result.ok().as_deref(), Some("False."));
    }

    #[test]
    fn extract_anthropic_content_missing() {
        let json = json!({"content": []});
        assert!(extract_anthropic_content(&json).is_err());
    }

    #[test]
    fn create_backend_dispatches_correctly() {
        let mut config = LlmBackendConfig {
            backend_type: BackendType::Gemini,
            api_url: "https://generativelanguage.googleapis.com/v1beta/".to_owned(),
            api_key: "test".to_owned(),
            model: "gemini-3-flash-preview".to_owned(),
        };
        assert_eq!(create_backend(&config).name(), "gemini");

        config.backend_type = BackendType::OpenAi;
        assert_eq!(create_backend(&config).name(), "openai-compatible");

        config.backend_type = BackendType::Anthropic;
        assert_eq!(create_backend(&config).name(), "anthropic");
    }
}
