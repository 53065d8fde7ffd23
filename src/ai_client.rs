//! LLM completion clients
//!
//! One prompt in, one free-text completion out. Backends:
//! - Gemini `generateContent` (default)
//! - Anthropic `messages`
//!
//! Clients are built from `Settings` and handed to the analyzer; nothing here
//! is global, so tests can swap in their own `CompletionClient`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{Settings, BACKEND_ANTHROPIC, BACKEND_GEMINI};
use crate::utils::truncate_chars;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 2048;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("{0} not set")]
    MissingApiKey(&'static str),
    #[error("unknown LLM backend '{0}' (expected 'gemini' or 'anthropic')")]
    UnknownBackend(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("model returned no text")]
    EmptyResponse,
}

/// Anything that can turn a prompt into a completion
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn backend(&self) -> &'static str;
    fn model(&self) -> &str;
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, CompletionError>;
}

/// Slack on top of the completion timeout for the HTTP client's own ceiling.
/// The analyzer's timeout must always fire first.
const TRANSPORT_GRACE: Duration = Duration::from_secs(5);

fn transport_timeout(completion_timeout: Duration) -> Duration {
    completion_timeout.saturating_add(TRANSPORT_GRACE)
}

fn http_client(completion_timeout: Duration) -> Result<reqwest::Client, CompletionError> {
    Ok(reqwest::Client::builder()
        .timeout(transport_timeout(completion_timeout))
        .user_agent(concat!("FinePrint/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, CompletionError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(CompletionError::Api {
        status,
        body: truncate_chars(&body, 500).to_string(),
    })
}

// ==================== Gemini ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

impl GeminiResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, CompletionError> {
        Ok(Self {
            http: http_client(timeout)?,
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    fn backend(&self) -> &'static str {
        BACKEND_GEMINI
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, CompletionError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig { temperature },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let parsed: GeminiResponse = error_for_status(response).await?.json().await?;
        parsed.into_text().ok_or(CompletionError::EmptyResponse)
    }
}

// ==================== Anthropic ====================

/// Anthropic API message format
#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Anthropic API request format
#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl AnthropicResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self.content.into_iter().filter_map(|c| c.text).collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, CompletionError> {
        Ok(Self {
            http: http_client(timeout)?,
            api_key,
            model,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    fn backend(&self) -> &'static str {
        BACKEND_ANTHROPIC
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, CompletionError> {
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: ANTHROPIC_MAX_TOKENS,
            temperature,
            messages: vec![Message { role: "user", content: prompt }],
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let parsed: AnthropicResponse = error_for_status(response).await?.json().await?;
        parsed.into_text().ok_or(CompletionError::EmptyResponse)
    }
}

/// Build the configured backend
pub fn build_client(settings: &Settings) -> Result<Arc<dyn CompletionClient>, CompletionError> {
    let model = settings.model_name();
    let timeout = settings.completion_timeout();

    match settings.llm_backend.as_str() {
        BACKEND_GEMINI => {
            let key = settings
                .gemini_api_key
                .clone()
                .ok_or(CompletionError::MissingApiKey("GEMINI_API_KEY"))?;
            Ok(Arc::new(GeminiClient::new(key, model, timeout)?))
        }
        BACKEND_ANTHROPIC => {
            let key = settings
                .anthropic_api_key
                .clone()
                .ok_or(CompletionError::MissingApiKey("ANTHROPIC_API_KEY"))?;
            Ok(Arc::new(AnthropicClient::new(key, model, timeout)?))
        }
        other => Err(CompletionError::UnknownBackend(other.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{extract::Path, http::HeaderMap, routing::post, Json, Router};

    #[test]
    fn test_gemini_response_text() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"a ||| b"},{"text":" ||| c"}],"role":"model"},"finishReason":"STOP"}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("a ||| b ||| c"));
    }

    #[test]
    fn test_gemini_blocked_response() {
        let json = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let parsed: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.into_text().is_none());
    }

    #[test]
    fn test_gemini_request_shape() {
        let request = GeminiRequest {
            contents: vec![GeminiContent { role: "user", parts: vec![GeminiPart { text: "hi" }] }],
            generation_config: GenerationConfig { temperature: 0.2 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert!(json["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn test_anthropic_response_text() {
        let json = r#"{"content":[{"type":"text","text":"quote\nrisk\nfix"}],"usage":{"input_tokens":10,"output_tokens":5}}"#;
        let parsed: AnthropicResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("quote\nrisk\nfix"));

        let empty: AnthropicResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(empty.into_text().is_none());
    }

    #[test]
    fn test_build_client_requires_key() {
        let settings = Settings::default();
        assert!(matches!(build_client(&settings), Err(CompletionError::MissingApiKey("GEMINI_API_KEY"))));

        let settings = Settings { llm_backend: "anthropic".to_string(), ..Settings::default() };
        assert!(matches!(build_client(&settings), Err(CompletionError::MissingApiKey("ANTHROPIC_API_KEY"))));
    }

    #[test]
    fn test_transport_timeout_outlasts_completion_timeout() {
        let timeout = Duration::from_secs(30);
        assert!(transport_timeout(timeout) > timeout);
        assert_eq!(transport_timeout(Duration::MAX), Duration::MAX);
    }

    #[test]
    fn test_build_client_backends() {
        let settings = Settings { gemini_api_key: Some("k".to_string()), ..Settings::default() };
        let client = build_client(&settings).unwrap();
        assert_eq!(client.backend(), BACKEND_GEMINI);
        assert_eq!(client.model(), "gemini-1.5-pro");

        let settings = Settings { llm_backend: "ollama".to_string(), ..Settings::default() };
        assert!(matches!(build_client(&settings), Err(CompletionError::UnknownBackend(b)) if b == "ollama"));
    }

    pub(crate) async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_gemini_round_trip_against_stub() {
        let app = Router::new().route(
            "/v1beta/models/{*rest}",
            post(|Path(rest): Path<String>, headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert!(rest.ends_with("gemini-1.5-pro:generateContent"));
                assert_eq!(headers.get("x-goog-api-key").unwrap(), "test-key");
                let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or("").to_string();
                Json(serde_json::json!({
                    "candidates": [{"content": {"parts": [{"text": format!("echo: {}", prompt)}]}}]
                }))
            }),
        );
        let base = serve(app).await;

        let client = GeminiClient::new("test-key".to_string(), "gemini-1.5-pro".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(base);
        let text = client.complete("hello", 0.2).await.unwrap();
        assert_eq!(text, "echo: hello");
    }

    #[tokio::test]
    async fn test_anthropic_api_error_status() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async { (axum::http::StatusCode::UNAUTHORIZED, "invalid x-api-key") }),
        );
        let base = serve(app).await;

        let client = AnthropicClient::new("bad".to_string(), "m".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(base);
        match client.complete("hello", 0.2).await {
            Err(CompletionError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid"));
            }
            other => panic!("expected API error, got {:?}", other.map(|_| ())),
        }
    }
}
