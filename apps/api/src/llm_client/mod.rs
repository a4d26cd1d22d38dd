/// LLM Client — the single point of entry for all language-model calls in Folio.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Pipeline code depends on the `LanguageModel` trait so a stub can stand in for tests.
///
/// One prompt in, one completion out. No retries, no streaming: a failed call
/// aborts the generation request that issued it.
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

#[cfg(test)]
pub mod stub;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Moderate temperature: favours consistent output over creative variance.
pub const DEFAULT_TEMPERATURE: f32 = 0.4;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned no candidate content")]
    EmptyContent,

    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("LLM call did not complete within {secs}s")]
    Timeout { secs: u64 },
}

/// A text-in, text-out language model.
///
/// Carried in `AppState` as `Arc<dyn LanguageModel>`.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends one prompt and returns the completion text.
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logs and responses.
    fn model_name(&self) -> &str;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (Gemini generateContent)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
    /// Set on reasoning parts emitted by thinking models; never part of the answer.
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Why the first candidate stopped, e.g. `STOP`, `MAX_TOKENS`, `SAFETY`.
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }

    /// Concatenates the text parts of the first candidate.
    ///
    /// Returns `None` only when there is no candidate or the candidate carries no
    /// content (safety block). Blank text is a valid answer: a reply without code
    /// blocks degrades downstream instead of failing the request.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            return Some(String::new());
        }
        Some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini REST client. Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    deadline: Duration,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            temperature: config.llm_temperature,
            deadline: config.llm_timeout,
        })
    }

    /// Makes a raw call to the generateContent endpoint, returning the full response object.
    /// The API key is only checked here, on the first real call.
    pub async fn call(&self, prompt: &str) -> Result<GenerateContentResponse, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let request_body = build_request(prompt, self.temperature);
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, output_tokens={}, finish_reason={}",
                self.model,
                usage.prompt_token_count,
                usage.candidates_token_count,
                parsed.finish_reason().unwrap_or("none")
            );
        }

        Ok(parsed)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        with_deadline(self.deadline, async {
            let response = self.call(prompt).await?;
            response.text().ok_or(LlmError::EmptyContent)
        })
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn build_request(prompt: &str, temperature: f32) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![RequestContent {
            role: "user",
            parts: vec![RequestPart { text: prompt }],
        }],
        generation_config: GenerationConfig { temperature },
    }
}

/// Pulls `error.message` out of a Gemini error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Bounds a model call by `deadline`. Dropping the inner future cancels the request.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, LlmError>
where
    F: Future<Output = Result<T, LlmError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout {
            secs: deadline.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(api_key: Option<&str>) -> Config {
        Config {
            gemini_api_key: api_key.map(String::from),
            ..Config::default()
        }
    }

    #[test]
    fn test_request_serializes_camel_case_generation_config() {
        let body = serde_json::to_value(build_request("hello", 0.4)).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "```html\n"}, {"text": "<h1>Hi</h1>\n```"}]},
                 "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 34}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().unwrap(), "```html\n<h1>Hi</h1>\n```");
        assert_eq!(response.finish_reason(), Some("STOP"));
        let usage = response.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 12);
        assert_eq!(usage.candidates_token_count, 34);
    }

    #[test]
    fn test_response_text_skips_thought_parts() {
        let json = r#"{"candidates": [{"content": {"parts": [
            {"text": "thinking...", "thought": true},
            {"text": "answer"}
        ]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().unwrap(), "answer");
    }

    #[test]
    fn test_response_text_none_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_response_text_none_when_blocked() {
        // Safety-blocked candidates come back without content.
        let json = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());
        assert_eq!(response.finish_reason(), Some("SAFETY"));
    }

    #[test]
    fn test_response_text_blank_completion_is_empty_string() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}, "finishReason": "STOP"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some(""));

        let json = r#"{"candidates": [{"content": {"parts": []}, "finishReason": "STOP"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some(""));
    }

    #[test]
    fn test_api_error_message_prefers_structured_body() {
        let body = r#"{"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(api_error_message(body.to_string()), "API key not valid");
        assert_eq!(api_error_message("plain".to_string()), "plain");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_on_first_call() {
        let client = GeminiClient::new(&test_config(None)).unwrap();
        let err = client.invoke("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_blank_api_key_counts_as_missing() {
        let client = GeminiClient::new(&test_config(Some("  "))).unwrap();
        let err = client.call("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[test]
    fn test_client_uses_configured_model() {
        let config = Config {
            gemini_model: "gemini-2.0-pro".to_string(),
            ..test_config(Some("k"))
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(client.model_name(), "gemini-2.0-pro");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expiry_is_timeout_error() {
        let result: Result<(), LlmError> = with_deadline(Duration::from_secs(5), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(LlmError::Timeout { secs: 5 })));
    }

    #[tokio::test]
    async fn test_deadline_passes_through_result() {
        let ok = with_deadline(Duration::from_secs(5), async { Ok::<_, LlmError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = with_deadline(Duration::from_secs(5), async {
            Err::<(), _>(LlmError::EmptyContent)
        })
        .await;
        assert!(matches!(err, Err(LlmError::EmptyContent)));
    }
}
